//! Configuration file management.
//!
//! The file is optional; every setting falls back to the monitor defaults.
//!
//! ```toml
//! [source]
//! url = "http://localhost:5000/api/lectura"
//! timeout_secs = 10
//!
//! [monitor]
//! poll_interval_secs = 5
//! tick_interval_secs = 1
//! online_threshold_secs = 30
//! window_size = 20
//! utc_offset_hours = -6
//!
//! [thresholds]
//! good_max = 300.0
//! medium_max = 600.0
//!
//! [display]
//! latest_count = 5
//! no_color = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use airwatch_core::config::{
    DEFAULT_ONLINE_THRESHOLD, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SOURCE_URL,
    DEFAULT_TICK_INTERVAL, DEFAULT_UTC_OFFSET_HOURS, DEFAULT_WINDOW_SIZE,
};
use airwatch_core::{MonitorConfig, ThresholdConfig};

use crate::cli::{MonitorArgs, SourceArgs};

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Readings source settings.
    pub source: SourceConfig,
    /// Polling and liveness settings.
    pub monitor: MonitorSection,
    /// Band boundaries.
    pub thresholds: ThresholdConfig,
    /// Output settings.
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from `path`, or defaults if it does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_toml()?;

        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - The source URL uses http or https and the timeout is non-zero
    /// - Poll and tick intervals and the window size are non-zero
    /// - The online threshold is longer than the poll interval
    /// - The UTC offset is a real-world offset
    /// - Band bounds are finite and ordered
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.source.validate());
        errors.extend(
            self.monitor_config()
                .issues()
                .into_iter()
                .map(|issue| ValidationError {
                    field: file_field(issue.field).to_string(),
                    message: issue.message,
                }),
        );

        if self.display.latest_count == 0 {
            errors.push(ValidationError {
                field: "display.latest_count".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Apply command-line source overrides.
    pub fn apply_source_args(&mut self, args: &SourceArgs) {
        if let Some(url) = &args.url {
            self.source.url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_secs = timeout;
        }
    }

    /// Apply command-line monitor overrides.
    pub fn apply_monitor_args(&mut self, args: &MonitorArgs) {
        if let Some(interval) = args.interval {
            self.monitor.poll_interval_secs = interval;
        }
        if let Some(threshold) = args.offline_after {
            self.monitor.online_threshold_secs = threshold;
        }
        if let Some(window) = args.window {
            self.monitor.window_size = window;
        }
    }

    /// Settings for the monitor.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig::builder()
            .poll_interval(Duration::from_secs(self.monitor.poll_interval_secs))
            .tick_interval(Duration::from_secs(self.monitor.tick_interval_secs))
            .online_threshold(Duration::from_secs(self.monitor.online_threshold_secs))
            .window_size(self.monitor.window_size)
            .utc_offset_hours(self.monitor.utc_offset_hours)
            .thresholds(self.thresholds)
            .build()
    }

    /// HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }
}

/// Readings source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Endpoint URL.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl SourceConfig {
    /// Validate source configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.url.trim().is_empty() {
            errors.push(ValidationError {
                field: "source.url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            errors.push(ValidationError {
                field: "source.url".to_string(),
                message: format!("'{}' must start with http:// or https://", self.url),
            });
        }

        if self.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "source.timeout_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        errors
    }
}

/// Polling and liveness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// Seconds between polls.
    pub poll_interval_secs: u64,
    /// Seconds between liveness re-evaluations.
    pub tick_interval_secs: u64,
    /// Seconds without a new reading before the device is offline.
    pub online_threshold_secs: u64,
    /// Readings kept in the chart window.
    pub window_size: usize,
    /// Display offset from UTC, in hours.
    pub utc_offset_hours: i8,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            tick_interval_secs: DEFAULT_TICK_INTERVAL.as_secs(),
            online_threshold_secs: DEFAULT_ONLINE_THRESHOLD.as_secs(),
            window_size: DEFAULT_WINDOW_SIZE,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

/// Name of the config file key behind a monitor setting.
fn file_field(setting: &str) -> &str {
    match setting {
        "poll_interval" => "monitor.poll_interval_secs",
        "tick_interval" => "monitor.tick_interval_secs",
        "online_threshold" => "monitor.online_threshold_secs",
        "window_size" => "monitor.window_size",
        "utc_offset_hours" => "monitor.utc_offset_hours",
        "good_max" => "thresholds.good_max",
        other => other,
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Number of latest readings to list.
    pub latest_count: usize,
    /// Disable colored output.
    pub no_color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            latest_count: 5,
            no_color: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., `monitor.window_size`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("airwatch")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(err: ConfigError) -> Vec<String> {
        match err {
            ConfigError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {}", other),
        }
    }

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.url, "http://localhost:5000/api/lectura");
        assert_eq!(config.monitor_config(), MonitorConfig::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let toml = r#"
            [monitor]
            window_size = 50

            [thresholds]
            medium_max = 800.0
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.monitor.window_size, 50);
        assert_eq!(config.monitor.poll_interval_secs, 5);
        assert_eq!(config.thresholds.good_max, 300.0);
        assert_eq!(config.thresholds.medium_max, 800.0);
        assert_eq!(config.display.latest_count, 5);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.source.url = "https://sensor.example/api/lectura".to_string();
        config.monitor.utc_offset_hours = 2;
        config.display.no_color = true;

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();
        assert!(loaded.validate().is_ok());
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        std::fs::write(&config_path, "[monitor\nwindow_size = ").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.source.url = "ftp://sensor".to_string();
        config.monitor.window_size = 0;
        config.monitor.online_threshold_secs = 5;
        config.monitor.utc_offset_hours = 20;
        config.thresholds.good_max = 900.0;

        let fields = fields(config.validate().unwrap_err());
        assert_eq!(
            fields,
            vec![
                "source.url",
                "monitor.window_size",
                "monitor.online_threshold_secs",
                "monitor.utc_offset_hours",
                "thresholds.good_max",
            ]
        );
    }

    #[test]
    fn test_monitor_issues_map_to_file_keys() {
        let mut config = Config::default();
        config.monitor.tick_interval_secs = 0;
        config.thresholds.medium_max = f64::NAN;

        let fields = fields(config.validate().unwrap_err());
        assert_eq!(fields, vec!["monitor.tick_interval_secs", "thresholds"]);
    }

    #[test]
    fn test_validation_error_display() {
        let error = ConfigError::Validation(vec![ValidationError {
            field: "monitor.window_size".to_string(),
            message: "must be at least 1".to_string(),
        }]);
        let message = error.to_string();
        assert!(message.contains("validation failed"));
        assert!(message.contains("  - monitor.window_size: must be at least 1"));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();
        config.apply_source_args(&SourceArgs {
            url: Some("http://10.0.0.5:5000/api/lectura".to_string()),
            timeout: Some(3),
        });
        config.apply_monitor_args(&MonitorArgs {
            interval: Some(2),
            offline_after: None,
            window: Some(10),
        });

        assert_eq!(config.source.url, "http://10.0.0.5:5000/api/lectura");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));

        let monitor = config.monitor_config();
        assert_eq!(monitor.poll_interval, Duration::from_secs(2));
        assert_eq!(monitor.online_threshold, Duration::from_secs(30));
        assert_eq!(monitor.window_size, 10);
        assert!(monitor.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("airwatch/config.toml"));
    }
}
