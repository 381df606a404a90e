//! Collapsing of identical requests started close together.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use futures_util::future::Shared;
use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::poll::FetchFuture;

struct Entry<T> {
    started: Instant,
    request: Shared<FetchFuture<T>>,
}

/// Shares one in-flight request per key among callers arriving within
/// `window` of its start. Late callers receive the same result.
pub struct Deduper<K, T> {
    window: Duration,
    inflight: Mutex<HashMap<K, Entry<T>>>,
}

impl<K, T> Debug for Deduper<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deduper")
            .field("window", &self.window)
            .field("entries", &self.inflight.lock().len())
            .finish()
    }
}

impl<K, T> Deduper<K, T>
where
    K: Clone + Eq + Hash + Debug,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Join the request for `key` started within the window, or start one
    /// with `make`.
    pub fn request(&self, key: &K, make: impl FnOnce() -> FetchFuture<T>) -> FetchFuture<T> {
        let now = Instant::now();
        let mut inflight = self.inflight.lock();
        inflight.retain(|_, entry| now.duration_since(entry.started) < self.window);

        if let Some(entry) = inflight.get(key) {
            debug!(key = ?key, "Joining in-flight request");
            return entry.request.clone().boxed();
        }

        let request = make().shared();
        inflight.insert(
            key.clone(),
            Entry {
                started: now,
                request: request.clone(),
            },
        );
        request.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::time::sleep;

    fn make(calls: &Arc<AtomicUsize>, value: u32) -> impl FnOnce() -> FetchFuture<u32> {
        let calls = calls.clone();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                sleep(Duration::from_millis(50)).await;
                Ok(value)
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn same_key_within_window_shares_result() {
        let calls = Arc::new(AtomicUsize::new(0));
        let deduper = Deduper::new(Duration::from_millis(500));

        let first = deduper.request(&"alice", make(&calls, 1));
        sleep(Duration::from_millis(100)).await;
        let second = deduper.request(&"alice", make(&calls, 2));

        assert_eq!(first.await, Ok(1));
        assert_eq!(second.await, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn different_keys_and_expired_window_fetch_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let deduper = Deduper::new(Duration::from_millis(500));

        let alice = deduper.request(&"alice", make(&calls, 1));
        let bob = deduper.request(&"bob", make(&calls, 2));
        assert_eq!(alice.await, Ok(1));
        assert_eq!(bob.await, Ok(2));

        sleep(Duration::from_millis(600)).await;
        let again = deduper.request(&"alice", make(&calls, 3));
        assert_eq!(again.await, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
