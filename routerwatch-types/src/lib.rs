//! # routerwatch-types
//!
//! Payload types returned by the router-management backend that routerwatch
//! polls. The backend fronts a fleet of routers and exposes their health,
//! per-customer traffic counters, and PPPoE session lists over REST.
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for every payload. Counter fields are
//!   decoded leniently because the backend sends them either as JSON numbers
//!   or as numeric strings.
//!
//! ## Example
//!
//! ```rust
//! use routerwatch_types::{SessionStatus, SessionUser};
//!
//! let user = SessionUser {
//!     username: "alice".to_string(),
//!     status: "connected".to_string(),
//!     ip: Some("10.0.0.7".to_string()),
//!     uptime: None,
//!     profile: Some("10M".to_string()),
//! };
//!
//! assert_eq!(user.session_status(), SessionStatus::Connected);
//! ```

mod action;
mod health;
#[cfg(feature = "serde")]
mod lenient;
mod router;
mod session;
mod traffic;

pub use action::*;
pub use health::*;
pub use router::*;
pub use session::*;
pub use traffic::*;
