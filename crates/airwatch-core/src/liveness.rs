//! Online/offline detection from the age of the newest reading.
//!
//! The tracker has two states. It is **Online** while the newest reading is
//! younger than the threshold and **Offline** otherwise. With no reading at
//! all it is always Offline.
//!
//! The state is re-evaluated on two independent triggers:
//! - a poll completing ([`LivenessTracker::on_poll`] / [`LivenessTracker::reset`])
//! - a clock tick ([`LivenessTracker::on_tick`]), which never touches the network
//!
//! Any failed or empty poll resets the tracker, so a stale "online" flag is
//! never carried across an unknown period.

use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;

use airwatch_types::NormalizedReading;

use crate::config::DEFAULT_ONLINE_THRESHOLD;
use crate::normalize::TimeNormalizer;

/// Derived liveness of the source device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LivenessState {
    /// Newest reading seen in the last successful poll.
    pub last_reading: Option<NormalizedReading>,
    /// Whole seconds since `last_reading`, 0 when there is none.
    pub seconds_since_last: u64,
    /// Whether the device is considered to be reporting.
    pub is_online: bool,
}

impl LivenessState {
    /// The "no data" state.
    pub const fn offline() -> Self {
        Self {
            last_reading: None,
            seconds_since_last: 0,
            is_online: false,
        }
    }
}

impl Default for LivenessState {
    fn default() -> Self {
        Self::offline()
    }
}

/// Compute liveness for `last` as seen at `now_local`.
///
/// `now_local` must be in the same display frame as the reading's timestamp.
/// Readings stamped in the future count as zero seconds old.
pub fn evaluate(
    last: Option<&NormalizedReading>,
    now_local: OffsetDateTime,
    threshold: Duration,
) -> LivenessState {
    let Some(reading) = last else {
        return LivenessState::offline();
    };

    let elapsed = (now_local - reading.timestamp).whole_seconds();
    let seconds_since_last = u64::try_from(elapsed).unwrap_or(0);

    LivenessState {
        last_reading: Some(*reading),
        seconds_since_last,
        is_online: seconds_since_last < threshold.as_secs(),
    }
}

/// Stateful wrapper around [`evaluate`] that remembers the newest reading.
#[derive(Debug, Clone)]
pub struct LivenessTracker {
    threshold: Duration,
    normalizer: TimeNormalizer,
    state: LivenessState,
}

impl Default for LivenessTracker {
    fn default() -> Self {
        Self::new(DEFAULT_ONLINE_THRESHOLD, TimeNormalizer::default())
    }
}

impl LivenessTracker {
    /// Create a tracker that starts Offline.
    pub fn new(threshold: Duration, normalizer: TimeNormalizer) -> Self {
        Self {
            threshold,
            normalizer,
            state: LivenessState::offline(),
        }
    }

    /// The configured threshold.
    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Current state.
    pub fn state(&self) -> &LivenessState {
        &self.state
    }

    /// Whether the device is online.
    pub fn is_online(&self) -> bool {
        self.state.is_online
    }

    /// A poll completed with `newest` as its most recent reading.
    ///
    /// Passing `None` is the same as [`reset`](Self::reset).
    pub fn on_poll(&mut self, newest: Option<NormalizedReading>, now_utc: OffsetDateTime) {
        let next = evaluate(newest.as_ref(), self.normalizer.normalize(now_utc), self.threshold);
        self.transition(next);
    }

    /// Recompute the age of the known reading without any new data.
    pub fn on_tick(&mut self, now_utc: OffsetDateTime) {
        let last = self.state.last_reading;
        let next = evaluate(last.as_ref(), self.normalizer.normalize(now_utc), self.threshold);
        self.transition(next);
    }

    /// Forget the known reading and report Offline.
    pub fn reset(&mut self) {
        self.transition(LivenessState::offline());
    }

    fn transition(&mut self, next: LivenessState) {
        if next.is_online != self.state.is_online {
            if next.is_online {
                info!("Source is online (last reading {}s ago)", next.seconds_since_last);
            } else if next.last_reading.is_some() {
                info!(
                    "Source went offline (no reading for {}s, threshold {}s)",
                    next.seconds_since_last,
                    self.threshold.as_secs()
                );
            } else {
                info!("Source went offline (no readings available)");
            }
        }
        self.state = next;
    }
}
