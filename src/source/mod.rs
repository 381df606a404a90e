//! Data acquisition from the router-management backend.
//!
//! - [`poll`]: [`PollingSource`], the interval poller with stale-response
//!   suppression
//! - [`dedup`]: [`Deduper`], collapsing of identical requests
//! - [`backend`]: the [`Backend`] trait and its REST implementation

pub mod backend;
pub mod dedup;
pub mod poll;

pub use backend::Backend;
pub use dedup::Deduper;
pub use poll::{Fetch, FetchFuture, PollConfig, PollingSource};
