//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use routerwatch_types::{Router, SessionUser, SystemHealth};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::data::history::{PeakTracker, Sample};
use crate::data::table::{self, PageSpec, SessionColumn, SortSpec};
use crate::data::{ErrorInfo, FetchState, TargetResolver};
use crate::monitor::{TrafficKey, TrafficMonitor};
use crate::source::{Backend, FetchFuture, PollConfig, PollingSource};
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Page size step for `+`/`-`.
const PAGE_SIZE_STEP: usize = 5;
const MAX_PAGE_SIZE: usize = 100;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Router health and live traffic of the monitored user.
    Dashboard,
    /// Paginated customer session table.
    Sessions,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::Sessions,
            View::Sessions => View::Dashboard,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Sessions => "Sessions",
        }
    }
}

/// Result of a fire-and-forget router action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Synced { router_id: u64, status: String },
    BackedUp { router_id: u64, file: String },
    Failed { action: &'static str, router_id: u64, error: ErrorInfo },
}

impl ActionOutcome {
    fn message(&self) -> String {
        match self {
            ActionOutcome::Synced { router_id, status } => {
                format!("Router {router_id}: {status}")
            }
            ActionOutcome::BackedUp { router_id, file } => {
                format!("Router {router_id}: backup created {file}")
            }
            ActionOutcome::Failed {
                action,
                router_id,
                error,
            } => format!("Router {router_id}: {action} failed: {error}"),
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    backend: Arc<dyn Backend>,

    // Sources and their latest state, refreshed on every tick
    routers_source: PollingSource<(), Vec<Router>>,
    health_source: PollingSource<u64, SystemHealth>,
    sessions_source: PollingSource<u64, Vec<SessionUser>>,
    pub routers: FetchState<Vec<Router>>,
    pub health: FetchState<SystemHealth>,
    pub sessions: FetchState<Vec<SessionUser>>,

    // Router selection
    router_resolver: TargetResolver<u64>,
    router_id: Option<u64>,

    pub monitor: TrafficMonitor,

    // Session table state
    pub session_sort: SortSpec<SessionColumn>,
    pub session_page: PageSpec,
    pub selected_row: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,

    actions_tx: mpsc::UnboundedSender<ActionOutcome>,
    actions_rx: mpsc::UnboundedReceiver<ActionOutcome>,
}

impl App {
    /// Create the app. Nothing is fetched until [`App::start`].
    pub fn new(backend: Arc<dyn Backend>, settings: &Settings, theme: Theme) -> Self {
        let routers_source = {
            let backend = backend.clone();
            PollingSource::new(
                "routers",
                move |_: &()| -> FetchFuture<Vec<Router>> { backend.routers() },
                PollConfig::on_demand(),
            )
        };
        let health_source = {
            let backend = backend.clone();
            PollingSource::new(
                "health",
                move |id: &u64| -> FetchFuture<SystemHealth> { backend.health(*id) },
                PollConfig::every(settings.polling.health),
            )
        };
        let sessions_source = {
            let backend = backend.clone();
            PollingSource::new(
                "sessions",
                move |id: &u64| -> FetchFuture<Vec<SessionUser>> { backend.users(*id) },
                PollConfig::every(settings.polling.sessions),
            )
        };
        let monitor = TrafficMonitor::new(backend.clone(), settings.monitor());
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();

        Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            backend,
            routers_source,
            health_source,
            sessions_source,
            routers: FetchState::loading(),
            health: FetchState::loading(),
            sessions: FetchState::loading(),
            router_resolver: TargetResolver::new(),
            router_id: None,
            monitor,
            session_sort: SortSpec::new(SessionColumn::Status),
            session_page: PageSpec::new(settings.page_size),
            selected_row: 0,
            theme,
            status_message: None,
            actions_tx,
            actions_rx,
        }
    }

    /// Start discovering routers, optionally pinning one up front.
    pub fn start(&mut self, router_id: Option<u64>) {
        if let Some(id) = router_id {
            self.router_resolver.select(id);
        }
        self.routers_source.start(Some(()));
    }

    /// Returns a description of the backend.
    pub fn source_description(&self) -> String {
        self.backend.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Pull new data from every source and re-resolve selections.
    ///
    /// Called once per redraw.
    pub fn tick(&mut self) {
        if let Some(routers) = self.routers_source.drain_updates().pop() {
            self.router_resolver
                .set_discovery(routers.iter().map(|r| r.id).collect());
        }

        let resolution = self.router_resolver.resolve();
        if let Some(id) = resolution.auto_selected {
            self.router_resolver.select(id);
        }
        if resolution.changed {
            self.switch_router(resolution.target);
        }

        let tick = self.monitor.tick();
        if let Some(user) = tick.auto_selected {
            self.set_status_message(format!("Monitoring {user}"));
        }

        while let Ok(outcome) = self.actions_rx.try_recv() {
            self.set_status_message(outcome.message());
        }

        self.routers = self.routers_source.state();
        self.health = self.health_source.state();
        self.sessions = self.sessions_source.state();
        self.clamp_session_selection();
    }

    fn switch_router(&mut self, router_id: Option<u64>) {
        match router_id {
            Some(id) => info!(router_id = id, "Router selected"),
            None => info!("No router available"),
        }
        self.router_id = router_id;
        self.health_source.start(router_id);
        self.sessions_source.start(router_id);
        match router_id {
            Some(id) => {
                self.monitor.set_router(Some(id));
                self.monitor.mount(id);
            }
            None => self.monitor.unmount(),
        }
        self.session_page.set_page(1, 0);
        self.selected_row = 0;
    }

    pub fn router_id(&self) -> Option<u64> {
        self.router_id
    }

    /// The selected router and its position in the router list (1-based).
    pub fn current_router(&self) -> Option<(usize, &Router)> {
        let id = self.router_id?;
        self.routers
            .data()?
            .iter()
            .enumerate()
            .find(|(_, r)| r.id == id)
            .map(|(i, r)| (i + 1, r))
    }

    pub fn router_count(&self) -> usize {
        self.routers.data().map_or(0, Vec::len)
    }

    /// Select the next router in list order, wrapping around.
    pub fn next_router(&mut self) {
        self.step_router(1);
    }

    /// Select the previous router in list order, wrapping around.
    pub fn prev_router(&mut self) {
        self.step_router(-1);
    }

    fn step_router(&mut self, step: isize) {
        let Some(routers) = self.routers.data().filter(|r| !r.is_empty()) else {
            return;
        };
        let len = routers.len() as isize;
        let current = self
            .router_id
            .and_then(|id| routers.iter().position(|r| r.id == id))
            .unwrap_or(0) as isize;
        let next = routers[(current + step).rem_euclid(len) as usize].id;
        self.router_resolver.select(next);
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// The session page currently shown.
    pub fn session_view(&self) -> Option<table::TableView<'_, SessionUser>> {
        let rows = self.sessions.data()?;
        let mut page = self.session_page;
        Some(table::view(rows, &self.session_sort, &mut page))
    }

    fn session_count(&self) -> usize {
        self.sessions.data().map_or(0, Vec::len)
    }

    fn clamp_session_selection(&mut self) {
        let total = self.session_count();
        self.session_page.clamp(total);
        let on_page = self.page_len();
        self.selected_row = self.selected_row.min(on_page.saturating_sub(1));
    }

    fn page_len(&self) -> usize {
        self.session_view().map_or(0, |view| view.page_rows.len())
    }

    /// Move selection down by one row.
    pub fn select_next(&mut self) {
        let max = self.page_len().saturating_sub(1);
        self.selected_row = (self.selected_row + 1).min(max);
    }

    /// Move selection up by one row.
    pub fn select_prev(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        let total = self.session_count();
        self.session_page.next(total);
        self.selected_row = 0;
    }

    pub fn prev_page(&mut self) {
        self.session_page.prev();
        self.selected_row = 0;
    }

    pub fn grow_page(&mut self) {
        let size = (self.session_page.page_size() + PAGE_SIZE_STEP).min(MAX_PAGE_SIZE);
        self.session_page.set_page_size(size);
        self.selected_row = 0;
    }

    pub fn shrink_page(&mut self) {
        let size = self
            .session_page
            .page_size()
            .saturating_sub(PAGE_SIZE_STEP)
            .max(PAGE_SIZE_STEP);
        self.session_page.set_page_size(size);
        self.selected_row = 0;
    }

    /// Cycle to the next sort column (ascending).
    pub fn cycle_sort(&mut self) {
        let next = self.session_sort.column.next();
        self.session_sort.toggle(next);
    }

    /// Toggle sort direction of the active column.
    pub fn toggle_sort_direction(&mut self) {
        let column = self.session_sort.column;
        self.session_sort.toggle(column);
    }

    /// The user under the cursor in the session table.
    pub fn selected_user(&self) -> Option<&SessionUser> {
        self.session_view()?.page_rows.get(self.selected_row).copied()
    }

    /// Monitor traffic of the user under the cursor.
    pub fn monitor_selected(&mut self) {
        let Some(user) = self.selected_user().map(|u| u.username.clone()) else {
            return;
        };
        info!(user = %user, "Traffic target selected");
        self.monitor.select_target(user.clone());
        self.set_status_message(format!("Monitoring {user}"));
    }

    /// Stop following an explicit user and monitor the first discovered target.
    pub fn monitor_discovered(&mut self) {
        info!("Traffic target selection cleared");
        self.monitor.clear_target();
        self.set_status_message("Monitoring first discovered target".to_string());
    }

    /// Manual retry of every source.
    pub fn refresh(&mut self) {
        self.routers_source.refresh();
        self.health_source.refresh();
        self.sessions_source.refresh();
        self.monitor.refresh();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Ask the backend to sync the selected router.
    pub fn trigger_sync(&mut self) {
        let Some(router_id) = self.router_id else {
            self.set_status_message("No router selected".to_string());
            return;
        };
        info!(router_id, "Sync requested");
        let request = self.backend.sync(router_id);
        self.spawn_action(request, move |result| match result {
            Ok(status) => ActionOutcome::Synced { router_id, status },
            Err(error) => ActionOutcome::Failed {
                action: "sync",
                router_id,
                error,
            },
        });
        self.set_status_message(format!("Syncing router {router_id}..."));
    }

    /// Ask the backend to back up the selected router.
    pub fn trigger_backup(&mut self) {
        let Some(router_id) = self.router_id else {
            self.set_status_message("No router selected".to_string());
            return;
        };
        info!(router_id, "Backup requested");
        let request = self.backend.backup(router_id);
        self.spawn_action(request, move |result| match result {
            Ok(file) => ActionOutcome::BackedUp { router_id, file },
            Err(error) => ActionOutcome::Failed {
                action: "backup",
                router_id,
                error,
            },
        });
        self.set_status_message(format!("Backing up router {router_id}..."));
    }

    fn spawn_action<F>(&self, request: FetchFuture<String>, outcome: F)
    where
        F: FnOnce(Result<String, ErrorInfo>) -> ActionOutcome + Send + 'static,
    {
        let tx = self.actions_tx.clone();
        tokio::spawn(async move {
            let outcome = outcome(request.await);
            if let ActionOutcome::Failed { action, error, .. } = &outcome {
                warn!(action, error = %error, "Router action failed");
            }
            let _ = tx.send(outcome);
        });
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Stop every source.
    pub fn shutdown(&mut self) {
        self.routers_source.stop();
        self.health_source.stop();
        self.sessions_source.stop();
        self.monitor.unmount();
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some((_, router)) = self.current_router() else {
            bail!("No router selected");
        };
        let history = self.monitor.history();
        let export = Export {
            exported_at: Local::now(),
            router,
            health: self.health.data(),
            traffic_target: self.monitor.target(),
            series: history.series().snapshot(),
            peaks: history.peaks(),
            sessions: self.sessions.data().map_or(&[], Vec::as_slice),
        };
        write_export(&export, path)
    }
}

/// JSON document written by `e` and `--export`.
#[derive(Debug, Serialize)]
struct Export<'a> {
    exported_at: DateTime<Local>,
    router: &'a Router,
    health: Option<&'a SystemHealth>,
    traffic_target: Option<&'a TrafficKey>,
    series: Vec<Sample>,
    peaks: &'a PeakTracker,
    sessions: &'a [SessionUser],
}

fn write_export(export: &Export<'_>, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "State exported");
    Ok(())
}

/// Fetch routers, health and sessions once and export them without a TUI.
///
/// Picks `router_id` if given, otherwise the first router. Health and session
/// failures are exported as missing data rather than aborting.
pub async fn export_snapshot(
    backend: &dyn Backend,
    router_id: Option<u64>,
    path: &Path,
) -> Result<()> {
    let routers = backend
        .routers()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list routers: {e}"))?;

    let mut resolver = TargetResolver::new();
    if let Some(id) = router_id {
        resolver.select(id);
    }
    resolver.set_discovery(routers.iter().map(|r| r.id).collect());
    let Some(id) = resolver.resolve().target else {
        bail!("No router available");
    };
    let Some(router) = routers.iter().find(|r| r.id == id) else {
        bail!("Router {id} not found");
    };

    let (health, sessions) = tokio::join!(backend.health(id), backend.users(id));
    let health = health
        .map_err(|e| warn!(router_id = id, error = %e, "Health unavailable"))
        .ok();
    let sessions = sessions
        .map_err(|e| warn!(router_id = id, error = %e, "Sessions unavailable"))
        .unwrap_or_default();

    let peaks = PeakTracker::new();
    let export = Export {
        exported_at: Local::now(),
        router,
        health: health.as_ref(),
        traffic_target: None,
        series: Vec::new(),
        peaks: &peaks,
        sessions: &sessions,
    };
    write_export(&export, path)
}
