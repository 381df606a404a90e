//! Failure classification for polled requests.
//!
//! A failed fetch is either transient (the backend or a gateway in front of it
//! is temporarily unavailable, so the next tick is expected to succeed) or
//! fatal (anything else). Transient failures are displayed as "still loading";
//! fatal ones as "offline".

use std::fmt;

use routerwatch_client::ClientError;
use serde::Serialize;

/// HTTP statuses treated as transient upstream unavailability.
pub const TRANSIENT_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// A failed fetch as seen by the polling layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    /// HTTP status, absent for connectivity-level failures.
    pub status: Option<u16>,
    pub message: String,
}

impl ErrorInfo {
    /// An error the backend answered with a status code.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// An error with no status (connection refused, DNS, decode, ...).
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        classify(Some(self)) == FailureClass::Transient
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

impl From<ClientError> for ErrorInfo {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, message } => ErrorInfo::with_status(status, message),
            other => ErrorInfo::network(other.to_string()),
        }
    }
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Backend warming up or a gateway fault; retried on the next tick.
    Transient,
    /// Shown to the operator as an offline state.
    Fatal,
}

/// Classify a failed fetch.
///
/// Transient iff a status is present and is one of 500, 502, 503, 504.
/// An absent error and an error without status are both fatal.
pub fn classify(error: Option<&ErrorInfo>) -> FailureClass {
    match error.and_then(|e| e.status) {
        Some(status) if TRANSIENT_STATUSES.contains(&status) => FailureClass::Transient,
        _ => FailureClass::Fatal,
    }
}
