//! # routerwatch-client
//!
//! Async REST client for the router-management backend that routerwatch
//! polls for router health, customer traffic and session lists.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use routerwatch_client::ApiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder()
//!         .endpoint("http://localhost:8080/api/v1")
//!         .build()?;
//!
//!     let reading = client.traffic(1, "alice").await?;
//!     println!("rx {} bps, tx {} bps", reading.rx, reading.tx);
//!     Ok(())
//! }
//! ```
//!
//! Failed requests keep the HTTP status in [`ClientError::Status`] so callers
//! can tell an upstream outage (5xx from the gateway) from a rejected request.

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiClientBuilder, APP_KEY_HEADER, DEFAULT_ENDPOINT};
pub use error::ClientError;

// Re-export types for convenience
pub use routerwatch_types::{
    BackupAck, MonitoringTarget, Router, SessionStatus, SessionUser, SyncAck, SystemHealth,
    TrafficReading,
};
