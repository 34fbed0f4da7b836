//! The monitoring state machine.
//!
//! [`Engine`] owns the reading window, the liveness tracker and the current
//! reading. It is mutated only through [`Engine::apply`] (or the individual
//! `on_*` methods) and exposes its state as an immutable [`Snapshot`].
//! It has no timers and performs no I/O; [`Monitor`](crate::Monitor) drives it.

use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;

use airwatch_types::{Band, DisplayColor, NormalizedReading, Reading};

use crate::config::MonitorConfig;
use crate::error::Error;
use crate::liveness::LivenessTracker;
use crate::normalize::TimeNormalizer;
use crate::thresholds::Thresholds;
use crate::window::{self, ReadingWindow, WindowSummary};

/// What a single poll cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The source returned at least one reading.
    Readings(Vec<Reading>),
    /// The source was reachable but returned nothing.
    Empty,
    /// The source could not be queried.
    Failed(String),
}

impl PollOutcome {
    /// Map a fetch result onto an outcome.
    pub fn from_result(result: Result<Vec<Reading>, Error>) -> Self {
        match result {
            Ok(readings) if readings.is_empty() => PollOutcome::Empty,
            Ok(readings) => PollOutcome::Readings(readings),
            Err(e) => PollOutcome::Failed(e.to_string()),
        }
    }
}

/// Events applied to the engine, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A poll completed.
    Poll(PollOutcome),
    /// Periodic liveness re-evaluation.
    Tick,
    /// Freeze the window.
    Pause,
    /// Unfreeze the window.
    Resume,
}

/// Counters for poll cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PollStats {
    /// Polls that returned readings.
    pub success_count: u64,
    /// Polls that returned an empty list.
    pub empty_count: u64,
    /// Polls that failed.
    pub failure_count: u64,
    /// Failures since the last poll that did not fail.
    pub consecutive_failures: u32,
    /// When the last poll completed, whatever its outcome.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_poll_at: Option<OffsetDateTime>,
    /// When the last failure happened.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_error_at: Option<OffsetDateTime>,
    /// Message of the last failure.
    pub last_error: Option<String>,
}

/// Everything a renderer needs, frozen at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Value of the newest reading from the last poll.
    pub current_value: Option<f64>,
    /// Band of `current_value`.
    pub current_band: Option<Band>,
    /// Display color of `current_value`.
    pub current_color: Option<DisplayColor>,
    /// Whether the device is reporting.
    pub is_online: bool,
    /// Whole seconds since the newest reading.
    pub seconds_since_last: u64,
    /// Display-frame timestamp of the newest reading.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_reading_at: Option<OffsetDateTime>,
    /// Chart window, oldest to newest.
    pub window: ReadingWindow,
    /// Aggregate over the window.
    pub summary: Option<WindowSummary>,
    /// Whether window updates are frozen.
    pub paused: bool,
    /// Poll counters.
    pub stats: PollStats,
    /// When this snapshot was taken (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Snapshot {
    /// Up to `k` window readings, newest first.
    pub fn latest(&self, k: usize) -> impl Iterator<Item = &NormalizedReading> {
        self.window.latest(k)
    }

    /// Whether nothing has been received since the last reset.
    pub fn has_data(&self) -> bool {
        self.current_value.is_some()
    }
}

/// The telemetry state machine.
#[derive(Debug, Clone)]
pub struct Engine {
    window_size: usize,
    normalizer: TimeNormalizer,
    thresholds: Thresholds,
    liveness: LivenessTracker,
    window: ReadingWindow,
    current: Option<NormalizedReading>,
    paused: bool,
    stats: PollStats,
    updated_at: OffsetDateTime,
}

impl Engine {
    /// Create an engine with no data.
    pub fn new(config: &MonitorConfig, now: OffsetDateTime) -> Self {
        let normalizer = TimeNormalizer::from_hours(config.utc_offset_hours);
        Self {
            window_size: config.window_size,
            normalizer,
            thresholds: Thresholds::new(config.thresholds),
            liveness: LivenessTracker::new(config.online_threshold, normalizer),
            window: ReadingWindow::empty(),
            current: None,
            paused: false,
            stats: PollStats::default(),
            updated_at: now,
        }
    }

    /// Apply one event.
    pub fn apply(&mut self, event: EngineEvent, now: OffsetDateTime) {
        match event {
            EngineEvent::Poll(outcome) => self.on_poll_result(outcome, now),
            EngineEvent::Tick => self.on_tick(now),
            EngineEvent::Pause => self.set_paused(true, now),
            EngineEvent::Resume => self.set_paused(false, now),
        }
    }

    /// Feed the result of a poll cycle.
    ///
    /// Readings rebuild the window (unless paused) and refresh the current
    /// value and liveness. Empty and failed polls both reset to "no data".
    pub fn on_poll_result(&mut self, outcome: PollOutcome, now: OffsetDateTime) {
        self.stats.last_poll_at = Some(now);
        self.updated_at = now;

        let readings = match outcome {
            PollOutcome::Readings(readings) => {
                self.stats.success_count += 1;
                self.stats.consecutive_failures = 0;
                readings
            }
            PollOutcome::Empty => {
                self.stats.empty_count += 1;
                self.stats.consecutive_failures = 0;
                Vec::new()
            }
            PollOutcome::Failed(message) => {
                self.stats.failure_count += 1;
                self.stats.consecutive_failures += 1;
                self.stats.last_error_at = Some(now);
                self.stats.last_error = Some(message);
                Vec::new()
            }
        };

        if self.paused {
            debug!("Window paused, skipping rebuild of {} reading(s)", readings.len());
        } else {
            self.window = ReadingWindow::rebuild(&readings, self.window_size, &self.normalizer);
        }

        self.current = window::newest(&readings).map(|r| self.normalizer.normalize_reading(*r));
        self.liveness.on_poll(self.current, now);

        debug!(
            "Applied poll: {} reading(s), window {}, online {}",
            readings.len(),
            self.window.len(),
            self.liveness.is_online()
        );
    }

    /// Re-evaluate liveness against the clock.
    pub fn on_tick(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
        self.liveness.on_tick(now);
    }

    /// Freeze or unfreeze window rebuilds.
    ///
    /// Current value and liveness keep updating while paused.
    pub fn set_paused(&mut self, paused: bool, now: OffsetDateTime) {
        if self.paused != paused {
            debug!("Window {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
        self.updated_at = now;
    }

    /// Whether window rebuilds are frozen.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The current window.
    pub fn window(&self) -> &ReadingWindow {
        &self.window
    }

    /// Take an immutable snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        let liveness = self.liveness.state();
        let classification = self
            .current
            .map(|r| self.thresholds.classify(r.value));

        Snapshot {
            current_value: self.current.map(|r| r.value),
            current_band: classification.map(|c| c.band),
            current_color: classification.map(|c| c.color),
            is_online: liveness.is_online,
            seconds_since_last: liveness.seconds_since_last,
            last_reading_at: liveness.last_reading.map(|r| r.timestamp),
            window: self.window.clone(),
            summary: self.window.summary(&self.thresholds),
            paused: self.paused,
            stats: self.stats.clone(),
            updated_at: self.updated_at,
        }
    }
}
