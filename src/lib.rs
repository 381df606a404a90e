//! # routerwatch
//!
//! A terminal dashboard for a router-management backend: live health of the
//! selected router, real-time traffic of one customer session, and the
//! paginated list of PPPoE sessions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (state) │    │(history, │    │(ratatui)│    │          │  │
//! │  └────┬────┘    │ tables)  │    └─────────┘    └──────────┘  │
//! │       │         └──────────┘                                 │
//! │       ▼                                                      │
//! │  ┌─────────┐    ┌──────────┐                                 │
//! │  │ monitor │───▶│  source  │◀── Backend (REST ApiClient)     │
//! │  │(traffic)│    │ (polling)│                                 │
//! │  └─────────┘    └──────────┘                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, router selection, session table state
//!   and router actions
//! - **[`source`]**: [`PollingSource`] tasks with request de-duplication and
//!   stale-response suppression, over the [`Backend`] trait
//! - **[`monitor`]**: The live traffic context ([`TrafficMonitor`])
//! - **[`data`]**: Failure classification, target resolution, rolling traffic
//!   history and the table view engine
//! - **[`config`]**: Layered [`Settings`]
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ```bash
//! # Poll a backend with an application key
//! routerwatch --endpoint http://10.0.0.1:8080/api/v1 --app-key secret
//!
//! # Write one JSON snapshot and exit
//! routerwatch --export snapshot.json --router 2
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use routerwatch::{ApiClient, App, Settings, Theme};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let client = ApiClient::builder().endpoint(&settings.endpoint).build().unwrap();
//! let mut app = App::new(Arc::new(client), &settings, Theme::dark());
//! app.start(None);
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod monitor;
pub mod source;
pub mod ui;

pub use app::{export_snapshot, App, View};
pub use config::Settings;
pub use data::{ErrorInfo, FailureClass, FetchState, TargetResolver, TrafficHistory};
pub use monitor::{TrafficKey, TrafficMonitor};
pub use routerwatch_client::ApiClient;
pub use source::{Backend, PollConfig, PollingSource};
pub use ui::Theme;
