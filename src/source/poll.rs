//! Interval polling of a keyed resource.
//!
//! A [`PollingSource`] owns one timer task while started. Each tick dispatches
//! a request on its own task; completions are applied to a shared
//! [`FetchState`] only if they belong to the current key and are newer than
//! the last applied response. In-flight requests are never cancelled, only
//! ignored once superseded.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::dedup::Deduper;
use crate::data::{ErrorInfo, FailureClass, FetchState};

/// A single in-flight fetch.
pub type FetchFuture<T> = BoxFuture<'static, Result<T, ErrorInfo>>;

/// Maximum number of successful payloads kept for [`PollingSource::drain_stamped`].
const MAX_PENDING_UPDATES: usize = 16;

/// Issues the request for one key.
pub trait Fetch<K, T>: Send + Sync + 'static {
    fn fetch(&self, key: &K) -> FetchFuture<T>;
}

impl<K, T, F> Fetch<K, T> for F
where
    F: Fn(&K) -> FetchFuture<T> + Send + Sync + 'static,
{
    fn fetch(&self, key: &K) -> FetchFuture<T> {
        self(key)
    }
}

/// Cadence of a [`PollingSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Time between dispatches, measured from the start of the previous one.
    /// `None` fetches once on start and then only on [`PollingSource::refresh`].
    pub interval: Option<Duration>,
    /// Requests for the same key started within this window share one
    /// in-flight request. Zero disables de-duplication.
    pub dedup_window: Duration,
}

impl PollConfig {
    /// Poll on `interval`, floored at one millisecond.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval: Some(interval.max(Duration::from_millis(1))),
            dedup_window: Duration::ZERO,
        }
    }

    pub fn on_demand() -> Self {
        Self {
            interval: None,
            dedup_window: Duration::ZERO,
        }
    }

    pub fn with_dedup(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }
}

struct Shared<T> {
    /// Bumped on every start/stop; completions of older generations are dropped.
    generation: u64,
    next_seq: u64,
    applied_seq: u64,
    state: FetchState<T>,
    /// Successful payloads with the time they were applied.
    updates: VecDeque<(DateTime<Local>, T)>,
}

/// Polls a keyed resource on a fixed interval.
pub struct PollingSource<K, T> {
    name: String,
    fetcher: Arc<dyn Fetch<K, T>>,
    config: PollConfig,
    deduper: Option<Arc<Deduper<K, T>>>,
    shared: Arc<Mutex<Shared<T>>>,
    key: Option<K>,
    wake: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl<K, T> Debug for PollingSource<K, T>
where
    K: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingSource")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("key", &self.key)
            .field("running", &self.task.is_some())
            .finish()
    }
}

impl<K, T> PollingSource<K, T>
where
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, fetcher: impl Fetch<K, T>, config: PollConfig) -> Self {
        let deduper = (!config.dedup_window.is_zero())
            .then(|| Arc::new(Deduper::new(config.dedup_window)));

        Self {
            name: name.into(),
            fetcher: Arc::new(fetcher),
            config,
            deduper,
            shared: Arc::new(Mutex::new(Shared {
                generation: 0,
                next_seq: 0,
                applied_seq: 0,
                state: FetchState::loading(),
                updates: VecDeque::new(),
            })),
            key: None,
            wake: Arc::new(Notify::new()),
            task: None,
        }
    }

    /// Share a de-duplication cache with other sources fetching the same keys.
    pub fn with_deduper(mut self, deduper: Arc<Deduper<K, T>>) -> Self {
        self.deduper = Some(deduper);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Start polling `key`, or suspend when it is absent.
    ///
    /// Re-starting a running source with the same key does nothing. A new key
    /// resets the state to loading and drops queued updates of the old key.
    pub fn start(&mut self, key: Option<K>) {
        if key.is_some() && key == self.key && self.is_running() {
            return;
        }

        let key_changed = key != self.key;
        self.stop();

        let generation = {
            let mut shared = self.shared.lock();
            if key_changed || key.is_none() {
                shared.state = FetchState::loading();
                shared.updates.clear();
            }
            shared.generation
        };

        self.key = key.clone();
        let Some(key) = key else {
            debug!(source = %self.name, "No target, polling suspended");
            return;
        };

        debug!(source = %self.name, key = ?key, interval = ?self.config.interval, "Starting poll");

        let dispatcher = Dispatcher {
            name: self.name.clone(),
            key,
            generation,
            fetcher: self.fetcher.clone(),
            deduper: self.deduper.clone(),
            shared: self.shared.clone(),
        };
        // A fresh Notify so a refresh issued before a restart cannot leak into it.
        let wake = Arc::new(Notify::new());
        self.wake = wake.clone();
        let interval = self.config.interval;

        self.task = Some(tokio::spawn(async move {
            match interval {
                Some(period) => {
                    let mut ticker = tokio::time::interval(period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        tokio::select! {
                            _ = ticker.tick() => {}
                            _ = wake.notified() => {}
                        }
                        dispatcher.dispatch();
                    }
                }
                None => {
                    dispatcher.dispatch();
                    loop {
                        wake.notified().await;
                        dispatcher.dispatch();
                    }
                }
            }
        }));
    }

    /// Stop the timer. In-flight requests complete but are discarded.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(source = %self.name, "Poll stopped");
        }
        self.shared.lock().generation += 1;
    }

    /// Request an immediate extra fetch (manual retry).
    pub fn refresh(&self) {
        if self.is_running() {
            self.wake.notify_one();
        }
    }

    /// Current state of the resource.
    pub fn state(&self) -> FetchState<T> {
        self.shared.lock().state.clone()
    }

    /// Successful payloads applied since the last call, oldest first.
    pub fn drain_updates(&self) -> Vec<T> {
        self.drain_stamped().into_iter().map(|(_, data)| data).collect()
    }

    /// Like [`PollingSource::drain_updates`], with the local time each
    /// payload was applied.
    pub fn drain_stamped(&self) -> Vec<(DateTime<Local>, T)> {
        self.shared.lock().updates.drain(..).collect()
    }
}

impl<K, T> Drop for PollingSource<K, T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Everything the timer task needs to issue and apply one request.
struct Dispatcher<K, T> {
    name: String,
    key: K,
    generation: u64,
    fetcher: Arc<dyn Fetch<K, T>>,
    deduper: Option<Arc<Deduper<K, T>>>,
    shared: Arc<Mutex<Shared<T>>>,
}

impl<K, T> Dispatcher<K, T>
where
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn dispatch(&self) {
        let seq = {
            let mut shared = self.shared.lock();
            shared.next_seq += 1;
            shared.next_seq
        };
        debug!(source = %self.name, key = ?self.key, seq, "Dispatching fetch");

        let request = match &self.deduper {
            Some(deduper) => deduper.request(&self.key, || self.fetcher.fetch(&self.key)),
            None => self.fetcher.fetch(&self.key),
        };

        let name = self.name.clone();
        let generation = self.generation;
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let result = request.await;
            apply(&shared, &name, generation, seq, result);
        });
    }
}

fn apply<T: Clone>(
    shared: &Mutex<Shared<T>>,
    name: &str,
    generation: u64,
    seq: u64,
    result: Result<T, ErrorInfo>,
) {
    let mut shared = shared.lock();
    if generation != shared.generation {
        debug!(source = %name, seq, "Discarding response for superseded target");
        return;
    }
    if seq <= shared.applied_seq {
        debug!(source = %name, seq, applied = shared.applied_seq, "Discarding out-of-order response");
        return;
    }
    shared.applied_seq = seq;

    match result {
        Ok(data) => {
            shared.state.apply_success(data.clone());
            shared.updates.push_back((Local::now(), data));
            while shared.updates.len() > MAX_PENDING_UPDATES {
                shared.updates.pop_front();
            }
        }
        Err(error) => match shared.state.apply_failure(error.clone()) {
            FailureClass::Transient => {
                debug!(source = %name, error = %error, "Backend unavailable, retrying next tick")
            }
            FailureClass::Fatal => warn!(source = %name, error = %error, "Fetch failed"),
        },
    }
}
