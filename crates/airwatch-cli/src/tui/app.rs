//! Application state for the dashboard.

use std::time::{Duration, Instant};

use airwatch_core::{Snapshot, Thresholds};

/// How long a status message stays in the footer.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Dashboard state. Everything shown on screen derives from the latest
/// snapshot plus a few view toggles.
#[derive(Debug)]
pub struct App {
    /// Latest snapshot from the monitor.
    pub snapshot: Snapshot,
    /// Source URL shown in the header.
    pub source: String,
    /// Bounds used to color individual readings.
    pub thresholds: Thresholds,
    /// Number of latest readings to list.
    pub latest_count: usize,
    /// Whether the help overlay is open.
    pub show_help: bool,
    status: Option<(String, Instant)>,
    should_quit: bool,
}

impl App {
    pub fn new(snapshot: Snapshot, source: String, thresholds: Thresholds, latest_count: usize) -> Self {
        Self {
            snapshot,
            source,
            thresholds,
            latest_count,
            show_help: false,
            status: None,
            should_quit: false,
        }
    }

    /// Replace the displayed snapshot.
    pub fn update(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }

    /// Whether the event loop should stop.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Request the event loop to stop.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Show a transient message in the footer.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    /// The footer message, if it has not expired.
    pub fn status(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|(_, at)| at.elapsed() < STATUS_TTL)
            .map(|(msg, _)| msg.as_str())
    }

    /// Drop an expired footer message.
    pub fn clean_expired_status(&mut self) {
        if self
            .status
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() >= STATUS_TTL)
        {
            self.status = None;
        }
    }
}
