//! Telemetry freshness and liveness engine for polled air-quality sensors.
//!
//! This crate polls an HTTP endpoint that serves timestamped ppm readings and
//! keeps a live picture of the device behind it: the current value and its
//! severity band, whether the device is still reporting, and a bounded
//! chronological window of recent readings for charting.
//!
//! # Features
//!
//! - **Polling**: fixed-interval fetches with an immediate first poll and forced refresh
//! - **Liveness**: online/offline from the age of the newest reading, re-evaluated every second
//! - **Windowing**: the most recent N readings, rebuilt from scratch on every poll
//! - **Classification**: Good / Medium / Bad bands with display colors
//! - **Pause**: freeze the chart window while current value and liveness keep updating
//! - **Testability**: injectable [`Clock`] and an in-memory [`MockSource`]
//!
//! # Bands
//!
//! | Band | Range (ppm) | Color |
//! |------|-------------|-------|
//! | Good | ≤ 300 | Green |
//! | Medium | 301 – 600 | Amber |
//! | Bad | > 600 | Red |
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use airwatch_core::{HttpSource, Monitor, MonitorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(HttpSource::new("http://localhost:5000/api/lectura")?);
//!     let handle = Monitor::spawn(source, MonitorConfig::default())?;
//!
//!     let mut updates = handle.subscribe();
//!     updates.changed().await?;
//!     let snapshot = updates.borrow().clone();
//!     println!("{:?} ppm, online: {}", snapshot.current_value, snapshot.is_online);
//!
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod liveness;
pub mod mock;
pub mod normalize;
pub mod poller;
pub mod source;
pub mod thresholds;
pub mod window;

// Re-export types crate
pub use airwatch_types;
pub use airwatch_types::{Band, DisplayColor, NormalizedReading, Reading};

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    DEFAULT_ONLINE_THRESHOLD, DEFAULT_POLL_INTERVAL, DEFAULT_SOURCE_URL, DEFAULT_WINDOW_SIZE,
    ConfigIssue, MonitorConfig, MonitorConfigBuilder,
};
pub use engine::{Engine, EngineEvent, PollOutcome, PollStats, Snapshot};
pub use error::{Error, Result};
pub use liveness::{LivenessState, LivenessTracker};
pub use mock::{MockSource, MockSourceBuilder};
pub use normalize::TimeNormalizer;
pub use poller::{Monitor, MonitorHandle};
pub use source::{DecodedBatch, HttpSource, ReadingsSource, decode_readings};
pub use thresholds::{Classification, ThresholdConfig, Thresholds, classify};
pub use window::{ReadingWindow, WindowSummary};
