//! REST client for the router-management backend.
//!
//! Every call is a single request/response; polling cadence, de-duplication
//! and failure classification are left to the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use routerwatch_client::ApiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder()
//!         .endpoint("http://localhost:8080/api/v1")
//!         .app_key("my-app-key")
//!         .build()?;
//!
//!     for router in client.routers().await? {
//!         let health = client.health(router.id).await?;
//!         println!("{}: cpu {}%", router.name, health.cpu);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use routerwatch_types::{
    BackupAck, MonitoringTarget, Router, SessionUser, SyncAck, SystemHealth, TrafficReading,
};

use crate::ClientError;

/// Default backend base URL.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/v1";

/// Header carrying the shared application key.
pub const APP_KEY_HEADER: &str = "X-App-Key";

/// Client for the router-management REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    app_key: Option<String>,
}

impl ApiClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Base URL requests are issued against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List the routers managed by the backend.
    pub async fn routers(&self) -> Result<Vec<Router>, ClientError> {
        self.get("/routers").await
    }

    /// Fetch the latest health snapshot of a router.
    pub async fn health(&self, router_id: u64) -> Result<SystemHealth, ClientError> {
        self.get(&format!("/router/{router_id}/health")).await
    }

    /// Fetch the customer session list of a router.
    pub async fn users(&self, router_id: u64) -> Result<Vec<SessionUser>, ClientError> {
        self.get(&format!("/router/{router_id}/users")).await
    }

    /// List the sessions available for live traffic monitoring.
    pub async fn targets(&self) -> Result<Vec<MonitoringTarget>, ClientError> {
        self.get("/monitoring/targets").await
    }

    /// Fetch one traffic reading for a customer on a router.
    pub async fn traffic(&self, router_id: u64, user: &str) -> Result<TrafficReading, ClientError> {
        let request = self
            .request(Method::GET, &format!("/router/{router_id}/traffic"))
            .query(&[("user", user)]);
        Self::send(request).await
    }

    /// Ask the backend to sync users and secrets from a router.
    pub async fn sync(&self, router_id: u64) -> Result<SyncAck, ClientError> {
        Self::send(self.request(Method::POST, &format!("/sync/{router_id}"))).await
    }

    /// Ask the backend to create a configuration backup on a router.
    pub async fn backup(&self, router_id: u64) -> Result<BackupAck, ClientError> {
        Self::send(self.request(Method::POST, &format!("/router/{router_id}/backup"))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.client.request(method, self.url(path));
        if let Some(key) = &self.app_key {
            request = request.header(APP_KEY_HEADER, key);
        }
        request
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        Self::send(self.request(Method::GET, path)).await
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        debug!(url = %response.url(), status = %response.status(), "backend response");
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

/// Builder for ApiClient.
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    endpoint: Option<String>,
    app_key: Option<String>,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Set the API base URL (default: `http://localhost:8080/api/v1`).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the shared application key sent with every request.
    pub fn app_key(mut self, app_key: impl Into<String>) -> Self {
        self.app_key = Some(app_key.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(ApiClient {
            client,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            app_key: self.app_key.filter(|key| !key.is_empty()),
        })
    }
}

/// Error body shape used by the backend (`{"error": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    status: Option<String>,
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.status))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_string())
}
