use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
];

/// Router uptime components, e.g. "1w2d3h4m5s".
const UPTIME_UNITS: &[(char, u64)] = &[
    ('w', 7 * 24 * 3600),
    ('d', 24 * 3600),
    ('h', 3600),
    ('m', 60),
    ('s', 1),
];

/// Parse duration strings like "1s", "500ms", "16.958µs", "2m", "0ns"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.parse()?;
            if !val.is_finite() || val < 0.0 {
                bail!("Invalid duration: {}", s);
            }
            return Ok(Duration::from_nanos((val * multiplier) as u64));
        }
    }

    bail!("Unknown duration format: {}", s)
}

/// Parse a poll interval: any [`parse_duration`] string except zero.
pub fn parse_interval(s: &str) -> Result<Duration> {
    let interval = parse_duration(s)?;
    if interval.is_zero() {
        bail!("Interval must be greater than zero: {}", s.trim());
    }
    Ok(interval)
}

/// Parse a unit-suffixed router uptime such as "3d4h5m6s".
///
/// Returns `None` for anything unparsable.
pub fn parse_uptime(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let mut total = 0u64;
    let mut digits = String::new();
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let (_, secs) = UPTIME_UNITS.iter().find(|(unit, _)| *unit == ch)?;
        let value: u64 = digits.parse().ok()?;
        total = total.checked_add(value.checked_mul(*secs)?)?;
        digits.clear();
    }

    digits.is_empty().then(|| Duration::from_secs(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        let d = parse_duration("29.992671083s").unwrap();
        assert!((d.as_secs_f64() - 29.992671083).abs() < 0.0001);
    }

    #[test]
    fn test_parse_milliseconds() {
        let d = parse_duration("500ms").unwrap();
        assert_eq!(d, Duration::from_millis(500));
    }

    #[test]
    fn test_parse_microseconds() {
        let d = parse_duration("16.958µs").unwrap();
        assert_eq!(d.as_nanos(), 16958);
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_interval_rejects_zero() {
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("0ms").is_err());
        assert_eq!(parse_interval("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("0s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_uptime() {
        assert_eq!(parse_uptime("1w2d3h4m5s"), Some(Duration::from_secs(788_645)));
        assert_eq!(parse_uptime("9m"), Some(Duration::from_secs(540)));
        assert_eq!(parse_uptime(""), None);
        assert_eq!(parse_uptime("12"), None);
        assert_eq!(parse_uptime("1x"), None);
    }
}
