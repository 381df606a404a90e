//! Router health snapshots.

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// System resource snapshot of a router (`GET /router/{id}/health`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemHealth {
    /// CPU load in percent, as reported by the router.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "crate::lenient::text"))]
    pub cpu: String,

    /// Total memory in bytes.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "crate::lenient::counter"))]
    pub total_memory: u64,

    /// Free memory in bytes.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "crate::lenient::counter"))]
    pub free_memory: u64,

    /// Uptime in the router's own notation (e.g. `3d4h12m`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub uptime: String,

    /// Hardware board name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub board_name: String,

    /// Firmware version.
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: String,
}

impl SystemHealth {
    /// CPU load parsed as a number, if the router reported one.
    pub fn cpu_percent(&self) -> Option<f64> {
        self.cpu.trim().trim_end_matches('%').trim().parse().ok()
    }

    /// Total memory rounded to whole megabytes.
    pub fn total_memory_mb(&self) -> u64 {
        (self.total_memory as f64 / BYTES_PER_MB).round() as u64
    }

    /// Free memory rounded to whole megabytes.
    pub fn free_memory_mb(&self) -> u64 {
        (self.free_memory as f64 / BYTES_PER_MB).round() as u64
    }

    /// Used memory in megabytes.
    pub fn used_memory_mb(&self) -> u64 {
        self.total_memory_mb().saturating_sub(self.free_memory_mb())
    }

    /// Used memory as a whole percentage of total memory.
    ///
    /// Returns `None` when the router reported no total memory.
    pub fn memory_percent(&self) -> Option<u8> {
        let total = self.total_memory_mb();
        if total == 0 {
            return None;
        }
        let percent = (self.used_memory_mb() as f64 / total as f64 * 100.0).round();
        Some(percent.min(100.0) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(total: u64, free: u64) -> SystemHealth {
        SystemHealth {
            total_memory: total,
            free_memory: free,
            ..Default::default()
        }
    }

    #[test]
    fn memory_figures_in_megabytes() {
        let h = health(256 * 1024 * 1024, 64 * 1024 * 1024);
        assert_eq!(h.total_memory_mb(), 256);
        assert_eq!(h.free_memory_mb(), 64);
        assert_eq!(h.used_memory_mb(), 192);
        assert_eq!(h.memory_percent(), Some(75));
    }

    #[test]
    fn memory_percent_absent_without_total() {
        assert_eq!(health(0, 0).memory_percent(), None);
    }

    #[test]
    fn cpu_percent_parses_plain_and_suffixed() {
        let mut h = SystemHealth {
            cpu: "12".to_string(),
            ..Default::default()
        };
        assert_eq!(h.cpu_percent(), Some(12.0));
        h.cpu = "7%".to_string();
        assert_eq!(h.cpu_percent(), Some(7.0));
        h.cpu = "n/a".to_string();
        assert_eq!(h.cpu_percent(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_backend_payload() {
        let json = r#"{
            "uptime": "2w1d",
            "cpu": "9",
            "total_memory": 1073741824,
            "free_memory": "536870912",
            "board_name": "CCR2004",
            "version": "7.14"
        }"#;
        let h: SystemHealth = serde_json::from_str(json).unwrap();
        assert_eq!(h.cpu, "9");
        assert_eq!(h.total_memory_mb(), 1024);
        assert_eq!(h.memory_percent(), Some(50));
        assert_eq!(h.board_name, "CCR2004");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn numeric_cpu_is_accepted() {
        let h: SystemHealth = serde_json::from_str(r#"{"cpu": 31}"#).unwrap();
        assert_eq!(h.cpu_percent(), Some(31.0));
    }
}
