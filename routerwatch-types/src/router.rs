//! Routers managed by the backend.

/// A router registered with the backend, as listed by `GET /routers`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Router {
    /// Backend identifier, used in every per-router path.
    pub id: u64,

    /// Human-readable router name.
    pub name: String,

    /// Management address of the router.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub host: Option<String>,

    /// Management API port.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub port: Option<u16>,
}

impl Router {
    /// Create a router entry with just an id and a name.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            host: None,
            port: None,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn deserializes_without_optional_fields() {
        let router: Router = serde_json::from_str(r#"{"id": 3, "name": "core-1"}"#).unwrap();
        assert_eq!(router, Router::new(3, "core-1"));
    }

    #[test]
    fn deserializes_with_address() {
        let router: Router =
            serde_json::from_str(r#"{"id": 1, "name": "edge", "host": "192.168.88.1", "port": 8728}"#)
                .unwrap();
        assert_eq!(router.host.as_deref(), Some("192.168.88.1"));
        assert_eq!(router.port, Some(8728));
    }
}
