//! Customer sessions and traffic-monitoring targets.

/// Connection state of a customer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// An active PPPoE session exists.
    Connected,
    /// The account is restricted to the isolation profile.
    Isolated,
    /// No active session.
    Offline,
    /// Any status string the backend may add later.
    Other,
}

impl SessionStatus {
    /// Parse the backend's status string, case-insensitively.
    pub fn parse(status: &str) -> Self {
        let status = status.trim();
        if status.eq_ignore_ascii_case("connected") {
            SessionStatus::Connected
        } else if status.eq_ignore_ascii_case("isolated") {
            SessionStatus::Isolated
        } else if status.eq_ignore_ascii_case("offline") {
            SessionStatus::Offline
        } else {
            SessionStatus::Other
        }
    }

    /// Returns the display label for this status.
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Connected => "Connected",
            SessionStatus::Isolated => "Isolated",
            SessionStatus::Offline => "Offline",
            SessionStatus::Other => "Unknown",
        }
    }
}

/// A customer account with its connection status (`GET /router/{id}/users`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionUser {
    /// PPPoE username.
    pub username: String,

    /// Raw status string (`connected`, `isolated`, `offline`, ...).
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: String,

    /// Assigned address while connected.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub ip: Option<String>,

    /// Session uptime while connected.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub uptime: Option<String>,

    /// Service plan profile.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub profile: Option<String>,
}

impl SessionUser {
    /// Parsed connection status.
    pub fn session_status(&self) -> SessionStatus {
        SessionStatus::parse(&self.status)
    }
}

/// An active session that can be selected for live traffic monitoring
/// (`GET /monitoring/targets`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitoringTarget {
    /// Session name (the PPPoE username).
    pub name: String,

    /// Assigned IP address.
    #[cfg_attr(feature = "serde", serde(default))]
    pub address: String,

    /// Caller MAC address.
    #[cfg_attr(feature = "serde", serde(default))]
    pub caller_id: String,

    /// Session uptime.
    #[cfg_attr(feature = "serde", serde(default))]
    pub uptime: String,

    /// Router the session lives on.
    #[cfg_attr(feature = "serde", serde(default))]
    pub router_id: u64,
}
