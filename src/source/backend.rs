//! The backend seam polled by the dashboard.

use futures_util::FutureExt;
use routerwatch_client::ApiClient;
use routerwatch_types::{MonitoringTarget, Router, SessionUser, SystemHealth, TrafficReading};

use super::poll::FetchFuture;
use crate::data::ErrorInfo;
use crate::monitor::TrafficKey;

/// Requests the dashboard issues against the router-management backend.
///
/// Every method returns an owned future so it can be driven by a
/// [`PollingSource`](super::PollingSource) task. Failures are already converted
/// to [`ErrorInfo`].
pub trait Backend: Send + Sync + 'static {
    fn routers(&self) -> FetchFuture<Vec<Router>>;

    fn health(&self, router_id: u64) -> FetchFuture<SystemHealth>;

    fn users(&self, router_id: u64) -> FetchFuture<Vec<SessionUser>>;

    /// Active sessions available for traffic monitoring.
    fn targets(&self) -> FetchFuture<Vec<MonitoringTarget>>;

    fn traffic(&self, key: &TrafficKey) -> FetchFuture<TrafficReading>;

    /// Trigger a user sync; resolves to the backend's status text.
    fn sync(&self, router_id: u64) -> FetchFuture<String>;

    /// Trigger a configuration backup; resolves to the created file name.
    fn backup(&self, router_id: u64) -> FetchFuture<String>;

    /// Human-readable description for the status bar.
    fn description(&self) -> String;
}

impl Backend for ApiClient {
    fn routers(&self) -> FetchFuture<Vec<Router>> {
        let client = self.clone();
        async move { client.routers().await.map_err(ErrorInfo::from) }.boxed()
    }

    fn health(&self, router_id: u64) -> FetchFuture<SystemHealth> {
        let client = self.clone();
        async move { client.health(router_id).await.map_err(ErrorInfo::from) }.boxed()
    }

    fn users(&self, router_id: u64) -> FetchFuture<Vec<SessionUser>> {
        let client = self.clone();
        async move { client.users(router_id).await.map_err(ErrorInfo::from) }.boxed()
    }

    fn targets(&self) -> FetchFuture<Vec<MonitoringTarget>> {
        let client = self.clone();
        async move { client.targets().await.map_err(ErrorInfo::from) }.boxed()
    }

    fn traffic(&self, key: &TrafficKey) -> FetchFuture<TrafficReading> {
        let client = self.clone();
        let key = key.clone();
        async move {
            client
                .traffic(key.router_id, &key.user)
                .await
                .map_err(ErrorInfo::from)
        }
        .boxed()
    }

    fn sync(&self, router_id: u64) -> FetchFuture<String> {
        let client = self.clone();
        async move {
            client
                .sync(router_id)
                .await
                .map(|ack| ack.status)
                .map_err(ErrorInfo::from)
        }
        .boxed()
    }

    fn backup(&self, router_id: u64) -> FetchFuture<String> {
        let client = self.clone();
        async move {
            client
                .backup(router_id)
                .await
                .map(|ack| ack.file)
                .map_err(ErrorInfo::from)
        }
        .boxed()
    }

    fn description(&self) -> String {
        format!("api: {}", self.endpoint())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory backend for tests.

    use parking_lot::Mutex;

    use super::*;

    pub(crate) struct FakeBackend {
        pub routers: Mutex<Vec<Router>>,
        pub health: Mutex<Result<SystemHealth, ErrorInfo>>,
        pub users: Mutex<Result<Vec<SessionUser>, ErrorInfo>>,
        pub targets: Mutex<Vec<MonitoringTarget>>,
        pub traffic: Mutex<Result<TrafficReading, ErrorInfo>>,
        /// Every traffic key requested, in order.
        pub traffic_calls: Mutex<Vec<TrafficKey>>,
        /// `sync:<id>` / `backup:<id>` for every triggered action.
        pub actions: Mutex<Vec<String>>,
    }

    impl Default for FakeBackend {
        fn default() -> Self {
            Self {
                routers: Mutex::new(Vec::new()),
                health: Mutex::new(Err(ErrorInfo::with_status(503, "No data yet"))),
                users: Mutex::new(Ok(Vec::new())),
                targets: Mutex::new(Vec::new()),
                traffic: Mutex::new(Ok(TrafficReading::default())),
                traffic_calls: Mutex::new(Vec::new()),
                actions: Mutex::new(Vec::new()),
            }
        }
    }

    impl FakeBackend {
        pub fn with_targets(names: &[&str]) -> Self {
            let backend = Self::default();
            *backend.targets.lock() = names
                .iter()
                .map(|name| MonitoringTarget {
                    name: name.to_string(),
                    router_id: 1,
                    ..Default::default()
                })
                .collect();
            backend
        }

        pub fn traffic_users(&self) -> Vec<String> {
            self.traffic_calls.lock().iter().map(|k| k.user.clone()).collect()
        }
    }

    fn ready<T: Send + 'static>(result: Result<T, ErrorInfo>) -> FetchFuture<T> {
        async move { result }.boxed()
    }

    impl Backend for FakeBackend {
        fn routers(&self) -> FetchFuture<Vec<Router>> {
            ready(Ok(self.routers.lock().clone()))
        }

        fn health(&self, _router_id: u64) -> FetchFuture<SystemHealth> {
            ready(self.health.lock().clone())
        }

        fn users(&self, _router_id: u64) -> FetchFuture<Vec<SessionUser>> {
            ready(self.users.lock().clone())
        }

        fn targets(&self) -> FetchFuture<Vec<MonitoringTarget>> {
            ready(Ok(self.targets.lock().clone()))
        }

        fn traffic(&self, key: &TrafficKey) -> FetchFuture<TrafficReading> {
            self.traffic_calls.lock().push(key.clone());
            let result = self.traffic.lock().clone().map(|mut reading| {
                reading.name = key.user.clone();
                reading
            });
            ready(result)
        }

        fn sync(&self, router_id: u64) -> FetchFuture<String> {
            self.actions.lock().push(format!("sync:{router_id}"));
            ready(Ok("Sync started".to_string()))
        }

        fn backup(&self, router_id: u64) -> FetchFuture<String> {
            self.actions.lock().push(format!("backup:{router_id}"));
            ready(Ok(format!("backup-{router_id}.backup")))
        }

        fn description(&self) -> String {
            "fake".to_string()
        }
    }
}
