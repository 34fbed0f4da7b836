//! Core types for air-quality telemetry.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::{ParseError, ParseResult};

/// A single reading as reported by the readings source.
///
/// The timestamp is the instant the source recorded the value, in UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Concentration in parts-per-million.
    pub value: f64,
    /// When the source recorded the value (UTC).
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
}

impl Reading {
    /// Create a new reading.
    #[must_use]
    pub fn new(value: f64, timestamp: OffsetDateTime) -> Self {
        Self { value, timestamp }
    }
}

/// A reading whose timestamp has been shifted into the display timezone.
///
/// `timestamp` is the source instant moved by the display offset, so its UTC
/// wall clock reads as local time. `source_timestamp` keeps the original instant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalizedReading {
    /// Concentration in parts-per-million.
    pub value: f64,
    /// Display-frame timestamp.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Original UTC timestamp from the source.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub source_timestamp: OffsetDateTime,
}

impl NormalizedReading {
    /// Wall-clock time in the display frame, without offset information.
    #[must_use]
    pub fn local_time(&self) -> PrimitiveDateTime {
        PrimitiveDateTime::new(self.timestamp.date(), self.timestamp.time())
    }
}

/// Severity band for a ppm value.
///
/// Bands are ordered by severity: `Good < Medium < Bad`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Band {
    /// Acceptable air quality.
    Good,
    /// Elevated concentration.
    Medium,
    /// High concentration.
    Bad,
}

impl Band {
    /// All bands in severity order.
    pub const ALL: [Band; 3] = [Band::Good, Band::Medium, Band::Bad];

    /// Short uppercase label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Band::Good => "GOOD",
            Band::Medium => "MEDIUM",
            Band::Bad => "BAD",
        }
    }

    /// Human-readable description of the band.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Band::Good => "Good - normal air quality",
            Band::Medium => "Medium - consider ventilation",
            Band::Bad => "Bad - ventilate now",
        }
    }

    /// Color a renderer should use for this band.
    #[must_use]
    pub fn color(&self) -> DisplayColor {
        match self {
            Band::Good => DisplayColor::Green,
            Band::Medium => DisplayColor::Amber,
            Band::Bad => DisplayColor::Red,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display color associated with a [`Band`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DisplayColor {
    Green,
    Amber,
    Red,
}

impl DisplayColor {
    /// CSS-style hex value.
    #[must_use]
    pub fn hex(&self) -> &'static str {
        match self {
            DisplayColor::Green => "#22c55e",
            DisplayColor::Amber => "#f59e0b",
            DisplayColor::Red => "#ef4444",
        }
    }

    /// RGB components.
    #[must_use]
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            DisplayColor::Green => (0x22, 0xc5, 0x5e),
            DisplayColor::Amber => (0xf5, 0x9e, 0x0b),
            DisplayColor::Red => (0xef, 0x44, 0x44),
        }
    }
}

/// A reading record exactly as it appears on the wire.
///
/// The source serves `[{"valor": 412.5, "fecha": "2025-01-01T12:00:00.123456"}, ...]`.
/// Extra fields are ignored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WireReading {
    /// Value in ppm.
    pub valor: f64,
    /// ISO-8601 timestamp, implicitly UTC when no offset is given.
    pub fecha: String,
}

impl TryFrom<WireReading> for Reading {
    type Error = ParseError;

    fn try_from(wire: WireReading) -> ParseResult<Self> {
        let timestamp = parse_source_timestamp(&wire.fecha)?;
        Ok(Reading::new(wire.valor, timestamp))
    }
}

/// Parse a timestamp as served by the readings source.
///
/// Timestamps carrying an offset (RFC 3339 or ISO-8601) keep it. Naive
/// timestamps such as `2025-01-01T12:00:00.123456` are interpreted as UTC.
/// A single space between date and time is accepted in place of `T`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidTimestamp`] if the string matches none of
/// the accepted forms.
pub fn parse_source_timestamp(raw: &str) -> ParseResult<OffsetDateTime> {
    let trimmed = raw.trim();
    let value = if trimmed.len() > 10 && trimmed.as_bytes()[10] == b' ' {
        let mut owned = trimmed.to_string();
        owned.replace_range(10..11, "T");
        owned
    } else {
        trimmed.to_string()
    };

    if let Ok(ts) = OffsetDateTime::parse(&value, &Rfc3339) {
        return Ok(ts);
    }
    if let Ok(ts) = OffsetDateTime::parse(&value, &Iso8601::DEFAULT) {
        return Ok(ts);
    }

    PrimitiveDateTime::parse(&value, &Iso8601::DEFAULT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| ParseError::InvalidTimestamp {
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
