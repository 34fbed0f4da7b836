//! Severity bands for ppm readings.
//!
//! This module classifies a concentration into a [`Band`] using two upper
//! bounds. Both bounds are inclusive: a value equal to a bound belongs to the
//! lower band.
//!
//! # Example
//!
//! ```
//! use airwatch_core::{Band, Thresholds};
//!
//! let thresholds = Thresholds::default();
//! assert_eq!(thresholds.evaluate(300.0), Band::Good);
//! assert_eq!(thresholds.evaluate(300.5), Band::Medium);
//! assert_eq!(thresholds.evaluate(601.0), Band::Bad);
//! ```

use serde::{Deserialize, Serialize};

use airwatch_types::{Band, DisplayColor};

use crate::config::ConfigIssue;

/// Configuration for band boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Upper bound for Good.
    pub good_max: f64,
    /// Upper bound for Medium.
    pub medium_max: f64,
    // Above medium_max is Bad
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            good_max: 300.0,
            medium_max: 600.0,
        }
    }
}

impl ThresholdConfig {
    /// Check that both bounds are finite and ordered.
    pub fn validate(&self) -> crate::error::Result<()> {
        match self.issues().into_iter().next() {
            Some(issue) => Err(crate::error::Error::InvalidConfig(issue.to_string())),
            None => Ok(()),
        }
    }

    pub(crate) fn issues(&self) -> Vec<ConfigIssue> {
        if !self.good_max.is_finite() || !self.medium_max.is_finite() {
            return vec![ConfigIssue::new("thresholds", "bounds must be finite")];
        }
        if self.good_max > self.medium_max {
            return vec![ConfigIssue::new(
                "good_max",
                format!("({}) must not exceed medium_max ({})", self.good_max, self.medium_max),
            )];
        }
        Vec::new()
    }
}

/// Result of classifying a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Severity band.
    pub band: Band,
    /// Color a renderer should draw the value with.
    pub color: DisplayColor,
}

impl From<Band> for Classification {
    fn from(band: Band) -> Self {
        Self {
            band,
            color: band.color(),
        }
    }
}

/// Threshold evaluator for ppm values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thresholds {
    config: ThresholdConfig,
}

impl Thresholds {
    /// Create a new threshold evaluator with the given configuration.
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Evaluate the band of a value.
    ///
    /// There is no input validation: negative values land in Good and
    /// NaN lands in Bad since it fails both comparisons.
    pub fn evaluate(&self, ppm: f64) -> Band {
        if ppm <= self.config.good_max {
            Band::Good
        } else if ppm <= self.config.medium_max {
            Band::Medium
        } else {
            Band::Bad
        }
    }

    /// Evaluate the band and its display color.
    pub fn classify(&self, ppm: f64) -> Classification {
        self.evaluate(ppm).into()
    }

    /// Check if a value is above the upper bound of `band`.
    pub fn exceeds_threshold(&self, ppm: f64, band: Band) -> bool {
        match band {
            Band::Good => ppm > self.config.good_max,
            Band::Medium => ppm > self.config.medium_max,
            Band::Bad => false, // No upper bound
        }
    }
}

/// Classify with the default bounds (300 / 600 ppm).
pub fn classify(ppm: f64) -> Classification {
    Thresholds::default().classify(ppm)
}
