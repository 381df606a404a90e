//! Bounded traffic history and running peaks for the monitored target.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Local};
use routerwatch_types::TrafficReading;
use serde::Serialize;

/// Default number of samples kept (one minute at a 1s poll interval).
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

/// Raw counters are bits per second; samples are stored in Mbps.
const BITS_PER_MEGABIT: f64 = 1_000_000.0;

/// A tracked traffic channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Receive rate (download).
    Rx,
    /// Transmit rate (upload).
    Tx,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Rx, Channel::Tx];

    pub fn label(&self) -> &'static str {
        match self {
            Channel::Rx => "Download",
            Channel::Tx => "Upload",
        }
    }
}

/// Convert a raw bit rate to Mbps rounded to two decimals.
pub fn to_mbps(bits: u64) -> f64 {
    (bits as f64 / BITS_PER_MEGABIT * 100.0).round() / 100.0
}

/// One traffic point, already converted to Mbps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Local>,
    pub rx: f64,
    pub tx: f64,
}

impl Sample {
    /// Build a sample from a raw reading, converting at ingestion time.
    pub fn from_reading(reading: &TrafficReading, timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            rx: to_mbps(reading.rx),
            tx: to_mbps(reading.tx),
        }
    }

    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Rx => self.rx,
            Channel::Tx => self.tx,
        }
    }
}

/// Fixed-capacity FIFO of samples in append order.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Default for RollingSeries {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl RollingSeries {
    /// Create an empty series. A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest ones beyond capacity.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Samples oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Running maximum per channel since the last reset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PeakTracker {
    peaks: BTreeMap<Channel, f64>,
}

impl PeakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the channel's peak to `value` if it is higher.
    pub fn update(&mut self, channel: Channel, value: f64) {
        let peak = self.peaks.entry(channel).or_insert(0.0);
        if value > *peak {
            *peak = value;
        }
    }

    /// Peak of a channel; zero if nothing was recorded since the last reset.
    pub fn peak(&self, channel: Channel) -> f64 {
        self.peaks.get(&channel).copied().unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.peaks.clear();
    }
}

/// Series and peaks of one monitored target.
///
/// Both halves are only reachable through this type so they are always reset
/// together.
#[derive(Debug, Clone, Default)]
pub struct TrafficHistory {
    series: RollingSeries,
    peaks: PeakTracker,
}

impl TrafficHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            series: RollingSeries::new(capacity),
            peaks: PeakTracker::new(),
        }
    }

    /// Convert a reading, append it and update the peaks.
    pub fn ingest(&mut self, reading: &TrafficReading, timestamp: DateTime<Local>) -> Sample {
        let sample = Sample::from_reading(reading, timestamp);
        for channel in Channel::ALL {
            self.peaks.update(channel, sample.value(channel));
        }
        self.series.push(sample.clone());
        sample
    }

    /// Clear the series and the peaks in one step.
    pub fn reset(&mut self) {
        self.series.reset();
        self.peaks.reset();
    }

    pub fn series(&self) -> &RollingSeries {
        &self.series
    }

    pub fn peaks(&self) -> &PeakTracker {
        &self.peaks
    }

    pub fn peak(&self, channel: Channel) -> f64 {
        self.peaks.peak(channel)
    }

    /// `(index, value)` points of a channel, oldest first, for charting.
    pub fn chart_points(&self, channel: Channel) -> Vec<(f64, f64)> {
        self.series
            .iter()
            .enumerate()
            .map(|(i, s)| (i as f64, s.value(channel)))
            .collect()
    }

    /// Sparkline data for a channel (normalized to 0-7 for 8 bar levels).
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self, channel: Channel) -> Vec<u8> {
        if self.series.len() < 2 {
            return Vec::new();
        }

        let max = self
            .series
            .iter()
            .map(|s| s.value(channel))
            .fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return vec![0; self.series.len()];
        }

        self.series
            .iter()
            .map(|s| {
                let normalized = (s.value(channel) / max * 7.0).round() as u8;
                normalized.min(7)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(rx: f64) -> Sample {
        Sample {
            timestamp: Local::now(),
            rx,
            tx: 0.0,
        }
    }

    #[test]
    fn conversion_rounds_to_two_decimals() {
        assert_eq!(to_mbps(2_500_000), 2.5);
        assert_eq!(to_mbps(1_200_000), 1.2);
        assert_eq!(to_mbps(1_234_567), 1.23);
        assert_eq!(to_mbps(1_235_000), 1.24);
        assert_eq!(to_mbps(0), 0.0);
    }

    #[test]
    fn series_caps_at_capacity_keeping_latest() {
        let mut series = RollingSeries::new(60);
        for i in 0..70 {
            series.push(sample(i as f64));
        }

        let snapshot = series.snapshot();
        assert_eq!(snapshot.len(), 60);
        let values: Vec<f64> = snapshot.iter().map(|s| s.rx).collect();
        let expected: Vec<f64> = (10..70).map(|i| i as f64).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn series_below_capacity_keeps_everything_in_order() {
        let mut series = RollingSeries::new(5);
        for i in 0..3 {
            series.push(sample(i as f64));
        }
        let values: Vec<f64> = series.iter().map(|s| s.rx).collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0]);
        assert_eq!(series.latest().map(|s| s.rx), Some(2.0));
    }

    #[test]
    fn zero_capacity_is_bumped() {
        let mut series = RollingSeries::new(0);
        series.push(sample(1.0));
        series.push(sample(2.0));
        assert_eq!(series.len(), 1);
        assert_eq!(series.capacity(), 1);
    }

    #[test]
    fn peak_is_running_maximum() {
        let mut peaks = PeakTracker::new();
        for v in [3.0, 9.5, 1.0, 9.4] {
            peaks.update(Channel::Rx, v);
        }
        assert_eq!(peaks.peak(Channel::Rx), 9.5);
        assert_eq!(peaks.peak(Channel::Tx), 0.0);
    }

    #[test]
    fn reset_then_single_update_yields_that_value() {
        let mut peaks = PeakTracker::new();
        peaks.update(Channel::Tx, 50.0);
        peaks.reset();
        peaks.update(Channel::Tx, 2.0);
        assert_eq!(peaks.peak(Channel::Tx), 2.0);
    }

    #[test]
    fn ingest_converts_and_tracks_peaks() {
        let mut history = TrafficHistory::new(60);
        let reading = TrafficReading::new("alice", 2_500_000, 1_200_000);

        let stored = history.ingest(&reading, Local::now());
        assert_eq!(stored.rx, 2.50);
        assert_eq!(stored.tx, 1.20);
        assert_eq!(history.series().latest(), Some(&stored));
        assert!(history.peak(Channel::Rx) >= 2.50);
        assert!(history.peak(Channel::Tx) >= 1.20);
    }

    #[test]
    fn reset_clears_series_and_peaks_together() {
        let mut history = TrafficHistory::new(60);
        history.ingest(&TrafficReading::new("a", 8_000_000, 4_000_000), Local::now());
        history.reset();

        assert!(history.series().is_empty());
        assert_eq!(history.peak(Channel::Rx), 0.0);
        assert_eq!(history.peak(Channel::Tx), 0.0);
    }

    #[test]
    fn sparkline_normalizes_to_eight_levels() {
        let mut history = TrafficHistory::new(60);
        for rx in [0, 3_500_000, 7_000_000] {
            history.ingest(&TrafficReading::new("a", rx, 0), Local::now());
        }
        assert_eq!(history.sparkline(Channel::Rx), vec![0, 4, 7]);
        assert_eq!(history.sparkline(Channel::Tx), vec![0, 0, 0]);
    }

    #[test]
    fn sparkline_needs_two_points() {
        let mut history = TrafficHistory::new(60);
        history.ingest(&TrafficReading::new("a", 1, 1), Local::now());
        assert!(history.sparkline(Channel::Rx).is_empty());
    }
}
