//! Output formatting utilities for text and JSON output.

use anyhow::Result;
use owo_colors::OwoColorize;
use time::OffsetDateTime;
use time::macros::format_description;

use airwatch_core::{Snapshot, Thresholds};
use airwatch_types::{Band, NormalizedReading};

/// Characters used for the text trend line, lowest to highest.
const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Formatting options for output.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Number of latest readings to list.
    pub latest_count: usize,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
    /// Bounds used to band individual window readings.
    pub thresholds: Thresholds,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self::new(false, 5)
    }
}

impl FormatOptions {
    pub fn new(no_color: bool, latest_count: usize) -> Self {
        Self {
            no_color,
            latest_count,
            compact: false,
            thresholds: Thresholds::default(),
        }
    }

    /// Create with custom band bounds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }
}

/// Format a band as a bracketed, colored label.
#[must_use]
pub fn format_band(band: Band, no_color: bool) -> String {
    let label = band.label();
    if no_color {
        format!("[{}]", label)
    } else {
        let (r, g, b) = band.color().rgb();
        format!("[{}]", label.truecolor(r, g, b))
    }
}

/// Format the online flag.
#[must_use]
pub fn format_online(is_online: bool, no_color: bool) -> String {
    match (is_online, no_color) {
        (true, true) => "[ONLINE]".to_string(),
        (false, true) => "[OFFLINE]".to_string(),
        (true, false) => format!("[{}]", "ONLINE".green().bold()),
        (false, false) => format!("[{}]", "OFFLINE".red().bold()),
    }
}

/// Format a concentration, or a placeholder when there is none.
#[must_use]
pub fn format_ppm(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1} ppm", v),
        None => "-- ppm".to_string(),
    }
}

/// Format age in human-readable format
#[must_use]
pub fn format_age(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s ago", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s ago", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m ago", seconds / 3600, (seconds % 3600) / 60)
    }
}

/// Format the wall-clock part of a display-frame timestamp.
#[must_use]
pub fn format_clock(ts: OffsetDateTime) -> String {
    ts.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| ts.to_string())
}

/// Format a display-frame timestamp with its date.
#[must_use]
pub fn format_datetime(ts: OffsetDateTime) -> String {
    ts.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| ts.to_string())
}

/// Render values as a one-line bar chart scaled between their min and max.
#[must_use]
pub fn sparkline(values: &[f64]) -> String {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let Some(min) = finite.iter().copied().reduce(f64::min) else {
        return String::new();
    };
    let max = finite.iter().copied().fold(min, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if !v.is_finite() {
                ' '
            } else if span <= f64::EPSILON {
                SPARK_CHARS[SPARK_CHARS.len() / 2]
            } else {
                let scaled = (v - min) / span * (SPARK_CHARS.len() - 1) as f64;
                SPARK_CHARS[scaled.round() as usize]
            }
        })
        .collect()
}

/// One line of the latest-readings list.
#[must_use]
pub fn format_reading_line(reading: &NormalizedReading, opts: &FormatOptions) -> String {
    let band = opts.thresholds.evaluate(reading.value);
    format!(
        "{}  {:>10}  {}",
        format_clock(reading.timestamp),
        format_ppm(Some(reading.value)),
        format_band(band, opts.no_color)
    )
}

/// Full multi-line report for a snapshot.
#[must_use]
pub fn format_snapshot_text(snapshot: &Snapshot, opts: &FormatOptions) -> String {
    let mut out = String::new();

    let band = snapshot
        .current_band
        .map(|b| format!(" {}", format_band(b, opts.no_color)))
        .unwrap_or_default();
    out.push_str(&format!(
        "Current:  {}{}\n",
        format_ppm(snapshot.current_value),
        band
    ));

    let last = match snapshot.last_reading_at {
        Some(ts) => format!(
            "last reading {} ({})",
            format_age(snapshot.seconds_since_last),
            format_datetime(ts)
        ),
        None => "no data".to_string(),
    };
    out.push_str(&format!(
        "Status:   {} {}\n",
        format_online(snapshot.is_online, opts.no_color),
        last
    ));

    if let Some(summary) = &snapshot.summary {
        out.push_str(&format!(
            "Window:   {} readings, min {:.1}, max {:.1}, mean {:.1}, worst {}{}\n",
            summary.count,
            summary.min,
            summary.max,
            summary.mean,
            format_band(summary.worst, opts.no_color),
            if snapshot.paused { " (paused)" } else { "" }
        ));
        out.push_str(&format!("Trend:    {}\n", sparkline(&snapshot.window.values())));

        out.push_str("Latest:\n");
        for reading in snapshot.latest(opts.latest_count) {
            out.push_str(&format!("  {}\n", format_reading_line(reading, opts)));
        }
    }

    if let Some(error) = &snapshot.stats.last_error
        && snapshot.stats.consecutive_failures > 0
    {
        let error = if opts.no_color {
            error.clone()
        } else {
            error.red().to_string()
        };
        out.push_str(&format!("Error:    {}\n", error));
    }

    out
}

/// Compact single-line status for `watch`.
#[must_use]
pub fn format_watch_line(snapshot: &Snapshot, opts: &FormatOptions) -> String {
    let mut line = format!(
        "{} {}",
        format_ppm(snapshot.current_value),
        format_online(snapshot.is_online, opts.no_color)
    );

    if let Some(band) = snapshot.current_band {
        line.push_str(&format!(" {}", format_band(band, opts.no_color)));
    }

    match snapshot.last_reading_at {
        Some(ts) => line.push_str(&format!(
            " last {} ({})",
            format_clock(ts),
            format_age(snapshot.seconds_since_last)
        )),
        None => line.push_str(" no data"),
    }

    line.push_str(&format!(" | window {}", snapshot.window.len()));
    if snapshot.paused {
        line.push_str(" (paused)");
    }
    if snapshot.stats.consecutive_failures > 0
        && let Some(error) = &snapshot.stats.last_error
    {
        line.push_str(&format!(" | {}", error));
    }

    line
}

/// Snapshot as JSON.
pub fn format_snapshot_json(snapshot: &Snapshot, opts: &FormatOptions) -> Result<String> {
    opts.as_json(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use airwatch_core::{Engine, MonitorConfig, PollOutcome};
    use airwatch_types::Reading;

    fn now() -> OffsetDateTime {
        time::macros::datetime!(2025-01-01 12:00:00 UTC)
    }

    fn snapshot_with(values: &[f64]) -> Snapshot {
        let mut engine = Engine::new(&MonitorConfig::default(), now());
        let readings: Vec<Reading> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                Reading::new(
                    *v,
                    now() - time::Duration::seconds((values.len() - 1 - i) as i64 + 3),
                )
            })
            .collect();
        engine.on_poll_result(PollOutcome::from_result(Ok(readings)), now());
        engine.snapshot()
    }

    fn plain() -> FormatOptions {
        FormatOptions::new(true, 5)
    }

    #[test]
    fn test_format_band_no_color() {
        assert_eq!(format_band(Band::Good, true), "[GOOD]");
        assert_eq!(format_band(Band::Medium, true), "[MEDIUM]");
        assert_eq!(format_band(Band::Bad, true), "[BAD]");
    }

    #[test]
    fn test_format_band_color_keeps_label() {
        let colored = format_band(Band::Bad, false);
        assert!(colored.contains("BAD"));
        assert_ne!(colored, "[BAD]");
    }

    #[test]
    fn test_format_online() {
        assert_eq!(format_online(true, true), "[ONLINE]");
        assert_eq!(format_online(false, true), "[OFFLINE]");
    }

    #[test]
    fn test_format_ppm() {
        assert_eq!(format_ppm(Some(412.34)), "412.3 ppm");
        assert_eq!(format_ppm(None), "-- ppm");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(0), "0s ago");
        assert_eq!(format_age(59), "59s ago");
        assert_eq!(format_age(125), "2m 5s ago");
        assert_eq!(format_age(7260), "2h 1m ago");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(now()), "12:00:00");
        assert_eq!(format_datetime(now()), "2025-01-01 12:00:00");
    }

    #[test]
    fn test_sparkline() {
        assert_eq!(sparkline(&[]), "");
        assert_eq!(sparkline(&[1.0, 8.0]), "▁█");
        assert_eq!(sparkline(&[5.0, 5.0, 5.0]), "▅▅▅");
        assert_eq!(sparkline(&[0.0, f64::NAN, 7.0]).chars().count(), 3);
    }

    #[test]
    fn test_snapshot_text_with_data() {
        let snapshot = snapshot_with(&[250.0, 500.0, 700.0]);
        let text = format_snapshot_text(&snapshot, &plain());

        assert!(text.contains("Current:  700.0 ppm [BAD]"));
        assert!(text.contains("[ONLINE] last reading 3s ago (2025-01-01 05:59:57)"));
        assert!(text.contains("Window:   3 readings, min 250.0, max 700.0"));
        assert!(text.contains("worst [BAD]"));

        let latest: Vec<&str> = text
            .lines()
            .skip_while(|l| *l != "Latest:")
            .skip(1)
            .collect();
        assert_eq!(latest.len(), 3);
        assert!(latest[0].contains("700.0 ppm"));
        assert!(latest[2].contains("250.0 ppm"));
    }

    #[test]
    fn test_snapshot_text_without_data() {
        let engine = Engine::new(&MonitorConfig::default(), now());
        let text = format_snapshot_text(&engine.snapshot(), &plain());
        assert!(text.contains("Current:  -- ppm\n"));
        assert!(text.contains("[OFFLINE] no data"));
        assert!(!text.contains("Latest:"));
    }

    #[test]
    fn test_snapshot_text_shows_error() {
        let mut engine = Engine::new(&MonitorConfig::default(), now());
        engine.on_poll_result(PollOutcome::Failed("connection refused".to_string()), now());
        let text = format_snapshot_text(&engine.snapshot(), &plain());
        assert!(text.contains("Error:    connection refused"));
    }

    #[test]
    fn test_reading_line_uses_configured_bounds() {
        let snapshot = snapshot_with(&[450.0]);
        let reading = snapshot.window.newest().unwrap();
        assert!(format_reading_line(reading, &plain()).ends_with("[MEDIUM]"));

        let strict = Thresholds::new(airwatch_core::ThresholdConfig {
            good_max: 100.0,
            medium_max: 400.0,
        });
        let line = format_reading_line(reading, &plain().with_thresholds(strict));
        assert!(line.ends_with("[BAD]"));
    }

    #[test]
    fn test_latest_count_limits_list() {
        let snapshot = snapshot_with(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let opts = FormatOptions::new(true, 2);
        let text = format_snapshot_text(&snapshot, &opts);
        let latest = text.lines().skip_while(|l| *l != "Latest:").skip(1).count();
        assert_eq!(latest, 2);
    }

    #[test]
    fn test_watch_line() {
        let snapshot = snapshot_with(&[250.0]);
        let line = format_watch_line(&snapshot, &plain());
        assert_eq!(
            line,
            "250.0 ppm [ONLINE] [GOOD] last 05:59:57 (3s ago) | window 1"
        );
    }

    #[test]
    fn test_watch_line_no_data() {
        let engine = Engine::new(&MonitorConfig::default(), now());
        let line = format_watch_line(&engine.snapshot(), &plain());
        assert_eq!(line, "-- ppm [OFFLINE] no data | window 0");
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot = snapshot_with(&[250.0, 420.0]);
        let json = format_snapshot_json(&snapshot, &plain().with_compact(true)).unwrap();
        assert!(json.ends_with('\n'));
        assert_eq!(json.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["current_value"], 420.0);
        assert_eq!(value["current_band"], "medium");
        assert_eq!(value["is_online"], true);
        assert_eq!(value["window"].as_array().unwrap().len(), 2);
    }
}
