//! Acknowledgements returned by on-demand router actions.

/// Response to `POST /sync/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncAck {
    /// Backend status message.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: String,
}

/// Response to `POST /router/{id}/backup`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackupAck {
    /// Backend status message.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: String,

    /// Name of the backup file created on the router.
    pub file: String,
}
