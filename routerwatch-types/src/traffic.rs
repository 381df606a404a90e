//! Per-customer traffic counters.

/// One traffic reading for a monitored customer
/// (`GET /router/{id}/traffic?user={name}`).
///
/// `rx` and `tx` are raw rates in bits per second. The backend may send them
/// as numbers or as numeric strings; missing or empty values read as zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficReading {
    /// User or interface the counters belong to.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,

    /// Receive rate in bits per second.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "crate::lenient::counter"))]
    pub rx: u64,

    /// Transmit rate in bits per second.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "crate::lenient::counter"))]
    pub tx: u64,
}

impl TrafficReading {
    /// Create a reading from raw bit rates.
    pub fn new(name: impl Into<String>, rx: u64, tx: u64) -> Self {
        Self {
            name: name.into(),
            rx,
            tx,
        }
    }
}
