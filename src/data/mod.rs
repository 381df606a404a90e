//! Data models and processing for polled telemetry.
//!
//! ## Submodules
//!
//! - [`failure`]: Classification of failed fetches ([`ErrorInfo`], [`classify`])
//! - [`fetch`]: The loading / offline / ready state of a polled resource
//! - [`resolver`]: Choosing the monitored entity ([`TargetResolver`])
//! - [`history`]: Rolling traffic samples and peaks ([`TrafficHistory`])
//! - [`table`]: Sorting and paging of tabular data ([`view`](table::view))
//! - [`duration`]: Parsing of duration and uptime strings (e.g., "1s", "500ms", "3d4h")
//!
//! ## Data Flow
//!
//! ```text
//! PollingSource result
//!        │
//!        ├──▶ FetchState (failure classified once, here)
//!        │
//!        ├──▶ TrafficHistory::ingest() (series + peaks)
//!        │
//!        └──▶ table::view() (sorted page of sessions)
//! ```

pub mod duration;
pub mod failure;
pub mod fetch;
pub mod history;
pub mod resolver;
pub mod table;

pub use failure::{classify, ErrorInfo, FailureClass};
pub use fetch::{FetchState, FetchView};
pub use history::{Channel, PeakTracker, RollingSeries, Sample, TrafficHistory};
pub use resolver::{Resolution, TargetResolver};
pub use table::{PageSpec, SessionColumn, SortDirection, SortSpec, TableView};
