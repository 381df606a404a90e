//! Layered settings: defaults, an optional TOML file, then environment.
//!
//! ```toml
//! endpoint = "http://10.0.0.1:8080/api/v1"
//! app_key = "secret"
//!
//! [polling]
//! health = "5s"
//! traffic = "1s"
//! ```
//!
//! Environment variables use the `ROUTERWATCH_` prefix and `__` between
//! nested keys, e.g. `ROUTERWATCH_POLLING__HEALTH=2s`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, Map};
use routerwatch_client::DEFAULT_ENDPOINT;
use serde::{Deserialize, Deserializer};

use crate::data::duration::{parse_duration, parse_interval};
use crate::data::history::DEFAULT_HISTORY_CAPACITY;
use crate::monitor::MonitorConfig;

const ENV_PREFIX: &str = "ROUTERWATCH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint: String,
    pub app_key: Option<String>,
    #[serde(deserialize_with = "duration_str")]
    pub request_timeout: Duration,
    pub polling: PollingSettings,
    pub history_capacity: usize,
    pub page_size: usize,
    pub log_file: Option<PathBuf>,
}

/// Poll cadence per resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    #[serde(deserialize_with = "interval_str")]
    pub health: Duration,
    #[serde(deserialize_with = "interval_str")]
    pub sessions: Duration,
    #[serde(deserialize_with = "interval_str")]
    pub traffic: Duration,
    /// Zero disables traffic de-duplication.
    #[serde(deserialize_with = "duration_str")]
    pub traffic_dedup: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            app_key: None,
            request_timeout: Duration::from_secs(10),
            polling: PollingSettings::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            page_size: 10,
            log_file: None,
        }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            health: Duration::from_secs(5),
            sessions: Duration::from_secs(30),
            traffic: Duration::from_secs(1),
            traffic_dedup: Duration::from_millis(500),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if given) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], reading variables from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let settings: Settings = builder
            .build()
            .and_then(|config| config.try_deserialize())
            .with_context(|| match path {
                Some(path) => format!("Failed to load settings from {}", path.display()),
                None => "Failed to load settings from environment".to_string(),
            })?;
        Ok(settings.normalized())
    }

    /// Traffic monitor parameters derived from these settings.
    pub fn monitor(&self) -> MonitorConfig {
        MonitorConfig {
            traffic_interval: self.polling.traffic,
            dedup_window: self.polling.traffic_dedup,
            history_capacity: self.history_capacity,
        }
    }

    fn normalized(mut self) -> Self {
        self.history_capacity = self.history_capacity.max(1);
        self.page_size = self.page_size.max(1);
        self.app_key = self.app_key.filter(|key| !key.is_empty());
        self
    }
}

fn duration_str<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

fn interval_str<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_interval(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_without_sources() {
        let settings = Settings::load_with_env(None, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.polling.health, Duration::from_secs(5));
        assert_eq!(settings.polling.sessions, Duration::from_secs(30));
        assert_eq!(settings.polling.traffic_dedup, Duration::from_millis(500));
        assert_eq!(settings.history_capacity, 60);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
endpoint = "http://10.0.0.1:8080/api/v1"
app_key = "k3y"
page_size = 25

[polling]
health = "2s"
traffic = "500ms"
"#
        )
        .unwrap();

        let settings = Settings::load_with_env(Some(file.path()), env(&[])).unwrap();
        assert_eq!(settings.endpoint, "http://10.0.0.1:8080/api/v1");
        assert_eq!(settings.app_key.as_deref(), Some("k3y"));
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.polling.health, Duration::from_secs(2));
        assert_eq!(settings.polling.traffic, Duration::from_millis(500));
        assert_eq!(settings.polling.sessions, Duration::from_secs(30));
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "history_capacity = 30\n[polling]\nhealth = \"2s\"").unwrap();

        let settings = Settings::load_with_env(
            Some(file.path()),
            env(&[
                ("ROUTERWATCH_POLLING__HEALTH", "7s"),
                ("ROUTERWATCH_HISTORY_CAPACITY", "120"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.polling.health, Duration::from_secs(7));
        assert_eq!(settings.history_capacity, 120);
    }

    #[test]
    fn invalid_duration_is_an_error() {
        let err = Settings::load_with_env(None, env(&[("ROUTERWATCH_REQUEST_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("soon"));
    }

    #[test]
    fn zero_poll_interval_is_an_error() {
        let err = Settings::load_with_env(None, env(&[("ROUTERWATCH_POLLING__HEALTH", "0s")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("greater than zero"));

        let settings =
            Settings::load_with_env(None, env(&[("ROUTERWATCH_POLLING__TRAFFIC_DEDUP", "0s")]))
                .unwrap();
        assert_eq!(settings.polling.traffic_dedup, Duration::ZERO);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(Settings::load_with_env(Some(&missing), env(&[])).is_err());
    }

    #[test]
    fn empty_app_key_and_zero_sizes_are_normalized() {
        let settings = Settings::load_with_env(
            None,
            env(&[
                ("ROUTERWATCH_APP_KEY", ""),
                ("ROUTERWATCH_PAGE_SIZE", "0"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.app_key, None);
        assert_eq!(settings.page_size, 1);
    }
}
