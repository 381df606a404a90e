//! Live traffic monitoring context.
//!
//! Owns the traffic target resolver, the target discovery and traffic
//! sources, and the history of the monitored target. The history is reset
//! whenever the monitored target changes and at no other time.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use routerwatch_types::{MonitoringTarget, TrafficReading};
use serde::Serialize;
use tracing::info;

use crate::data::history::{TrafficHistory, DEFAULT_HISTORY_CAPACITY};
use crate::data::{FetchState, TargetResolver};
use crate::source::{Backend, FetchFuture, PollConfig, PollingSource};

/// The entity whose traffic is polled: one user on one router.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TrafficKey {
    pub router_id: u64,
    pub user: String,
}

impl fmt::Display for TrafficKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.router_id)
    }
}

/// Cadence and capacity of a [`TrafficMonitor`].
#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    pub traffic_interval: Duration,
    pub dedup_window: Duration,
    pub history_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            traffic_interval: Duration::from_secs(1),
            dedup_window: Duration::from_millis(500),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// What happened during one [`TrafficMonitor::tick`].
#[derive(Debug, Default, PartialEq)]
pub struct MonitorTick {
    /// Target picked automatically from a fresh discovery list.
    pub auto_selected: Option<String>,
    /// The monitored target changed and the history was reset.
    pub target_changed: bool,
    /// Number of samples appended to the history.
    pub ingested: usize,
}

pub struct TrafficMonitor {
    resolver: TargetResolver<String>,
    targets: PollingSource<(), Vec<MonitoringTarget>>,
    traffic: PollingSource<TrafficKey, TrafficReading>,
    history: TrafficHistory,
    router_id: Option<u64>,
    active: Option<TrafficKey>,
}

impl TrafficMonitor {
    pub fn new(backend: Arc<dyn Backend>, config: MonitorConfig) -> Self {
        let targets = {
            let backend = backend.clone();
            PollingSource::new(
                "targets",
                move |_: &()| -> FetchFuture<Vec<MonitoringTarget>> { backend.targets() },
                PollConfig::on_demand(),
            )
        };
        let traffic = PollingSource::new(
            "traffic",
            move |key: &TrafficKey| -> FetchFuture<TrafficReading> { backend.traffic(key) },
            PollConfig::every(config.traffic_interval).with_dedup(config.dedup_window),
        );

        Self {
            resolver: TargetResolver::new(),
            targets,
            traffic,
            history: TrafficHistory::new(config.history_capacity),
            router_id: None,
            active: None,
        }
    }

    /// Start discovering targets for `router_id`.
    pub fn mount(&mut self, router_id: u64) {
        self.router_id = Some(router_id);
        self.targets.start(Some(()));
    }

    /// Switch router. The selected user is kept; the key change resets the
    /// history on the next tick.
    pub fn set_router(&mut self, router_id: Option<u64>) {
        self.router_id = router_id;
    }

    /// Explicitly monitor `user`.
    pub fn select_target(&mut self, user: impl Into<String>) {
        self.resolver.select(user.into());
    }

    /// Drop the explicit selection and fall back to discovery.
    pub fn clear_target(&mut self) {
        self.resolver.clear_selection();
    }

    /// Stop all sources and forget the target and its history.
    pub fn unmount(&mut self) {
        self.targets.start(None);
        self.traffic.start(None);
        self.resolver.clear_discovery();
        self.history.reset();
        self.router_id = None;
        if let Some(key) = self.active.take() {
            info!(target_key = %key, "Traffic monitoring stopped");
        }
    }

    /// Manual retry of both sources.
    pub fn refresh(&self) {
        self.targets.refresh();
        self.traffic.refresh();
    }

    /// Apply discovery results, re-resolve the target and ingest new samples.
    pub fn tick(&mut self) -> MonitorTick {
        let mut tick = MonitorTick::default();

        if let Some(list) = self.targets.drain_updates().pop() {
            self.resolver
                .set_discovery(list.into_iter().map(|t| t.name).collect());
        }

        let resolution = self.resolver.resolve();
        if let Some(user) = resolution.auto_selected {
            info!(user = %user, "Auto-selected traffic target");
            self.resolver.select(user.clone());
            tick.auto_selected = Some(user);
        }

        let key = match (self.router_id, resolution.target) {
            (Some(router_id), Some(user)) => Some(TrafficKey { router_id, user }),
            _ => None,
        };
        if key != self.active {
            match &key {
                Some(key) => info!(target_key = %key, "Monitoring traffic"),
                None => info!("No traffic target, monitoring suspended"),
            }
            self.history.reset();
            self.traffic.start(key.clone());
            self.active = key;
            tick.target_changed = true;
        }

        for (applied_at, reading) in self.traffic.drain_stamped() {
            self.history.ingest(&reading, applied_at);
            tick.ingested += 1;
        }

        tick
    }

    /// The target currently polled.
    pub fn target(&self) -> Option<&TrafficKey> {
        self.active.as_ref()
    }

    pub fn history(&self) -> &TrafficHistory {
        &self.history
    }

    pub fn traffic_state(&self) -> FetchState<TrafficReading> {
        self.traffic.state()
    }

    pub fn targets_state(&self) -> FetchState<Vec<MonitoringTarget>> {
        self.targets.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::history::Channel;
    use crate::data::ErrorInfo;
    use crate::source::backend::fake::FakeBackend;
    use chrono::Local;
    use tokio::time::sleep;

    fn monitor(backend: &Arc<FakeBackend>) -> TrafficMonitor {
        TrafficMonitor::new(backend.clone(), MonitorConfig::default())
    }

    async fn settle() {
        sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn auto_selects_first_target_and_ingests_mbps() {
        let backend = Arc::new(FakeBackend::with_targets(&["alice", "carol"]));
        *backend.traffic.lock() = Ok(serde_json::from_str(
            r#"{"name":"alice","rx":"2500000","tx":"1200000"}"#,
        )
        .unwrap());

        let mut monitor = monitor(&backend);
        monitor.mount(1);
        settle().await;

        let tick = monitor.tick();
        assert_eq!(tick.auto_selected.as_deref(), Some("alice"));
        assert!(tick.target_changed);
        assert_eq!(
            monitor.target(),
            Some(&TrafficKey {
                router_id: 1,
                user: "alice".to_string()
            })
        );

        settle().await;
        let tick = monitor.tick();
        assert_eq!(tick.auto_selected, None);
        assert_eq!(tick.ingested, 1);

        let history = monitor.history();
        let latest = history.series().latest().unwrap();
        assert_eq!((latest.rx, latest.tx), (2.50, 1.20));
        assert!(history.peak(Channel::Rx) >= 2.50);
        assert!(history.peak(Channel::Tx) >= 1.20);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_selection_wins_over_discovery() {
        let backend = Arc::new(FakeBackend::with_targets(&["alice", "carol"]));
        let mut monitor = monitor(&backend);
        monitor.select_target("bob");
        monitor.mount(1);
        settle().await;

        let tick = monitor.tick();
        assert_eq!(tick.auto_selected, None);
        settle().await;
        assert_eq!(backend.traffic_users(), vec!["bob"]);
    }

    #[tokio::test(start_paused = true)]
    async fn no_target_suspends_traffic() {
        let backend = Arc::new(FakeBackend::with_targets(&[]));
        let mut monitor = monitor(&backend);
        monitor.mount(1);
        settle().await;

        let tick = monitor.tick();
        assert!(!tick.target_changed);
        sleep(Duration::from_secs(3)).await;
        monitor.tick();

        assert!(monitor.target().is_none());
        assert!(backend.traffic_calls.lock().is_empty());
        assert!(monitor.traffic_state().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn history_resets_only_on_target_change() {
        let backend = Arc::new(FakeBackend::with_targets(&["alice", "carol"]));
        *backend.traffic.lock() = Ok(TrafficReading::new("alice", 8_000_000, 1_000_000));

        let mut monitor = monitor(&backend);
        monitor.mount(1);
        settle().await;
        monitor.tick();
        sleep(Duration::from_millis(2500)).await;
        monitor.tick();
        assert_eq!(monitor.history().series().len(), 3);

        *backend.traffic.lock() = Err(ErrorInfo::with_status(503, "warming up"));
        sleep(Duration::from_secs(2)).await;
        let tick = monitor.tick();
        assert!(!tick.target_changed);
        assert_eq!(tick.ingested, 0);
        assert_eq!(monitor.history().series().len(), 3);
        assert_eq!(monitor.history().peak(Channel::Rx), 8.0);

        monitor.select_target("carol");
        let tick = monitor.tick();
        assert!(tick.target_changed);
        assert!(monitor.history().series().is_empty());
        assert_eq!(monitor.history().peak(Channel::Rx), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn samples_keep_their_response_time() {
        let backend = Arc::new(FakeBackend::with_targets(&["alice"]));
        *backend.traffic.lock() = Ok(TrafficReading::new("alice", 1_000_000, 1_000_000));

        let mut monitor = monitor(&backend);
        monitor.mount(1);
        settle().await;
        monitor.tick();

        let started = Local::now();
        sleep(Duration::from_millis(2500)).await;
        let before_tick = Local::now();
        let tick = monitor.tick();
        assert_eq!(tick.ingested, 3);

        let stamps: Vec<_> = monitor.history().series().iter().map(|s| s.timestamp).collect();
        assert!(stamps.iter().all(|at| *at >= started && *at <= before_tick));
        assert!(stamps.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn router_switch_rekeys_traffic() {
        let backend = Arc::new(FakeBackend::with_targets(&["alice"]));
        let mut monitor = monitor(&backend);
        monitor.mount(1);
        settle().await;
        monitor.tick();
        settle().await;
        monitor.tick();
        assert_eq!(monitor.history().series().len(), 1);

        monitor.set_router(Some(2));
        let tick = monitor.tick();
        assert!(tick.target_changed);
        assert!(monitor.history().series().is_empty());
        settle().await;

        let last = backend.traffic_calls.lock().last().cloned().unwrap();
        assert_eq!(last.router_id, 2);
        assert_eq!(last.user, "alice");
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_stops_polling() {
        let backend = Arc::new(FakeBackend::with_targets(&["alice"]));
        let mut monitor = monitor(&backend);
        monitor.mount(1);
        settle().await;
        monitor.tick();
        settle().await;
        monitor.tick();

        monitor.unmount();
        let calls = backend.traffic_calls.lock().len();
        sleep(Duration::from_secs(5)).await;

        assert_eq!(backend.traffic_calls.lock().len(), calls);
        assert!(monitor.target().is_none());
        assert!(monitor.history().series().is_empty());
    }
}
