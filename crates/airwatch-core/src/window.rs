//! Bounded, chronologically ordered window of recent readings.
//!
//! The window is never appended to. Each poll rebuilds it from the full
//! fetched set:
//!
//! 1. stable sort by timestamp, newest first
//! 2. keep the first `capacity` readings
//! 3. reverse into oldest-to-newest order
//! 4. normalize each timestamp
//!
//! Gaps and out-of-order arrivals therefore heal on the next poll. Readings
//! sharing a timestamp are all kept; after step 3 they appear in reverse
//! source order.

use serde::Serialize;

use airwatch_types::{Band, NormalizedReading, Reading};

use crate::normalize::TimeNormalizer;
use crate::thresholds::Thresholds;

/// Oldest-to-newest readings, at most `capacity` long.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReadingWindow {
    readings: Vec<NormalizedReading>,
}

impl ReadingWindow {
    /// An empty window.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a window from everything a poll returned.
    pub fn rebuild(fetched: &[Reading], capacity: usize, normalizer: &TimeNormalizer) -> Self {
        let mut sorted: Vec<&Reading> = fetched.iter().collect();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sorted.truncate(capacity);

        let readings = sorted
            .into_iter()
            .rev()
            .map(|r| normalizer.normalize_reading(*r))
            .collect();

        Self { readings }
    }

    /// Number of readings held.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the window holds no readings.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Readings in chronological order.
    pub fn as_slice(&self) -> &[NormalizedReading] {
        &self.readings
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedReading> {
        self.readings.iter()
    }

    /// Most recent reading.
    pub fn newest(&self) -> Option<&NormalizedReading> {
        self.readings.last()
    }

    /// Oldest reading.
    pub fn oldest(&self) -> Option<&NormalizedReading> {
        self.readings.first()
    }

    /// Up to `k` readings, newest first.
    ///
    /// Returns fewer than `k` when the window is shorter.
    pub fn latest(&self, k: usize) -> impl Iterator<Item = &NormalizedReading> {
        self.readings.iter().rev().take(k)
    }

    /// Values in chronological order, for charting.
    pub fn values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.value).collect()
    }

    /// Min / max / mean / worst band over the window.
    pub fn summary(&self, thresholds: &Thresholds) -> Option<WindowSummary> {
        let first = self.readings.first()?;
        let mut min = first.value;
        let mut max = first.value;
        let mut sum = 0.0;
        let mut worst = Band::Good;

        for reading in &self.readings {
            min = min.min(reading.value);
            max = max.max(reading.value);
            sum += reading.value;
            worst = worst.max(thresholds.evaluate(reading.value));
        }

        Some(WindowSummary {
            count: self.readings.len(),
            min,
            max,
            mean: sum / self.readings.len() as f64,
            worst,
        })
    }
}

impl<'a> IntoIterator for &'a ReadingWindow {
    type Item = &'a NormalizedReading;
    type IntoIter = std::slice::Iter<'a, NormalizedReading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}

/// Aggregate over the readings currently in a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowSummary {
    /// Number of readings.
    pub count: usize,
    /// Lowest value.
    pub min: f64,
    /// Highest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Most severe band of any reading.
    pub worst: Band,
}

/// The newest reading in a fetched set.
///
/// Among readings sharing the newest timestamp, the first in source order wins.
pub fn newest(fetched: &[Reading]) -> Option<&Reading> {
    fetched.iter().fold(None, |best: Option<&Reading>, r| match best {
        Some(b) if b.timestamp >= r.timestamp => Some(b),
        _ => Some(r),
    })
}
