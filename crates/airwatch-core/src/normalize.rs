//! Conversion of source timestamps into the display timezone.
//!
//! The offset is fixed by configuration and never read from the host
//! locale, so the same reading renders identically wherever the engine runs.

use time::{Duration, OffsetDateTime, UtcOffset};

use airwatch_types::{NormalizedReading, Reading};

use crate::config::DEFAULT_UTC_OFFSET_HOURS;

/// Shifts UTC instants by a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeNormalizer {
    offset: Duration,
}

impl Default for TimeNormalizer {
    fn default() -> Self {
        Self::from_hours(DEFAULT_UTC_OFFSET_HOURS)
    }
}

impl TimeNormalizer {
    /// Create a normalizer with an arbitrary offset.
    pub fn new(offset: Duration) -> Self {
        Self { offset }
    }

    /// Create a normalizer from a whole-hour offset (e.g. `-6`).
    pub fn from_hours(hours: i8) -> Self {
        Self::new(Duration::hours(i64::from(hours)))
    }

    /// The configured offset.
    pub fn offset(&self) -> Duration {
        self.offset
    }

    /// Move a UTC instant into the display frame.
    ///
    /// The result is expressed in UTC so that its wall clock reads as local time.
    pub fn normalize(&self, utc: OffsetDateTime) -> OffsetDateTime {
        utc.to_offset(UtcOffset::UTC).saturating_add(self.offset)
    }

    /// Normalize a single source reading.
    pub fn normalize_reading(&self, reading: Reading) -> NormalizedReading {
        NormalizedReading {
            value: reading.value,
            timestamp: self.normalize(reading.timestamp),
            source_timestamp: reading.timestamp,
        }
    }
}
