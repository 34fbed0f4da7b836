//! Monitor settings and their defaults.
//!
//! Every value has a built-in default, so a monitor can run without any
//! configuration file:
//!
//! | Setting | Default |
//! |---------|---------|
//! | Poll interval | 5 s |
//! | Liveness tick | 1 s |
//! | Window size | 20 readings |
//! | Online threshold | 30 s |
//! | Display offset | UTC-6 |
//! | Bands | Good ≤ 300 ppm < Medium ≤ 600 ppm < Bad |
//!
//! The online threshold must stay strictly above the poll interval, otherwise
//! the device would flap offline between two healthy polls. The defaults leave
//! six poll intervals of margin.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::thresholds::ThresholdConfig;

/// Default readings endpoint.
pub const DEFAULT_SOURCE_URL: &str = "http://localhost:5000/api/lectura";
/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Default interval between liveness re-evaluations.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Default age after which the device is reported offline.
pub const DEFAULT_ONLINE_THRESHOLD: Duration = Duration::from_secs(30);
/// Default number of readings kept for charting.
pub const DEFAULT_WINDOW_SIZE: usize = 20;
/// Default display offset from UTC, in hours.
pub const DEFAULT_UTC_OFFSET_HOURS: i8 = -6;
/// Default capacity of the engine event queue.
pub const DEFAULT_EVENT_BUFFER: usize = 32;

/// Settings for a [`Monitor`](crate::Monitor).
///
/// Use the builder for partial overrides:
///
/// ```
/// use std::time::Duration;
/// use airwatch_core::MonitorConfig;
///
/// let config = MonitorConfig::builder()
///     .poll_interval(Duration::from_secs(10))
///     .online_threshold(Duration::from_secs(60))
///     .build();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.window_size, 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Interval between polls of the source. The first poll is immediate.
    pub poll_interval: Duration,
    /// Interval between liveness re-evaluations.
    pub tick_interval: Duration,
    /// Age of the newest reading at which the device turns offline.
    pub online_threshold: Duration,
    /// Maximum number of readings in the window.
    pub window_size: usize,
    /// Display offset from UTC, in whole hours.
    pub utc_offset_hours: i8,
    /// Band boundaries.
    pub thresholds: ThresholdConfig,
    /// Capacity of the engine event queue.
    pub event_buffer: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            tick_interval: DEFAULT_TICK_INTERVAL,
            online_threshold: DEFAULT_ONLINE_THRESHOLD,
            window_size: DEFAULT_WINDOW_SIZE,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            thresholds: ThresholdConfig::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl MonitorConfig {
    /// Create a new builder.
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }

    /// Validate the settings and return an error if invalid.
    ///
    /// Reports the first problem found by [`issues`](Self::issues).
    pub fn validate(&self) -> Result<()> {
        match self.issues().into_iter().next() {
            Some(issue) => Err(Error::InvalidConfig(issue.to_string())),
            None => Ok(()),
        }
    }

    /// Every problem with these settings.
    ///
    /// Checks that:
    /// - `poll_interval`, `tick_interval` and `event_buffer` are > 0
    /// - `window_size` is > 0
    /// - `online_threshold` is greater than `poll_interval`
    /// - `utc_offset_hours` is within -12..=14
    /// - band bounds are finite and ordered
    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (field, zero) in [
            ("poll_interval", self.poll_interval.is_zero()),
            ("tick_interval", self.tick_interval.is_zero()),
            ("window_size", self.window_size == 0),
            ("event_buffer", self.event_buffer == 0),
        ] {
            if zero {
                issues.push(ConfigIssue::new(field, "must be > 0"));
            }
        }

        if self.online_threshold <= self.poll_interval {
            issues.push(ConfigIssue::new(
                "online_threshold",
                format!(
                    "({:?}) must be greater than poll_interval ({:?})",
                    self.online_threshold, self.poll_interval
                ),
            ));
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            issues.push(ConfigIssue::new(
                "utc_offset_hours",
                format!("{} is outside -12..=14", self.utc_offset_hours),
            ));
        }

        issues.extend(self.thresholds.issues());
        issues
    }
}

/// One problem found while validating settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Name of the offending setting.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ConfigIssue {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Builder for MonitorConfig.
#[derive(Debug, Clone, Default)]
pub struct MonitorConfigBuilder {
    config: MonitorConfig,
}

impl MonitorConfigBuilder {
    /// Set the poll interval.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the liveness tick interval.
    #[must_use]
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    /// Set the online threshold.
    #[must_use]
    pub fn online_threshold(mut self, threshold: Duration) -> Self {
        self.config.online_threshold = threshold;
        self
    }

    /// Set the window size.
    #[must_use]
    pub fn window_size(mut self, size: usize) -> Self {
        self.config.window_size = size;
        self
    }

    /// Set the display offset.
    #[must_use]
    pub fn utc_offset_hours(mut self, hours: i8) -> Self {
        self.config.utc_offset_hours = hours;
        self
    }

    /// Set the band boundaries.
    #[must_use]
    pub fn thresholds(mut self, thresholds: ThresholdConfig) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    /// Set the event queue capacity.
    #[must_use]
    pub fn event_buffer(mut self, size: usize) -> Self {
        self.config.event_buffer = size;
        self
    }

    /// Build the MonitorConfig.
    #[must_use]
    pub fn build(self) -> MonitorConfig {
        self.config
    }
}
