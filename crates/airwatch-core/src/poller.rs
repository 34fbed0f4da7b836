//! Background monitoring of a readings source.
//!
//! [`Monitor::spawn`] starts three tasks that share one cancellation token:
//!
//! - the **engine** task owns the [`Engine`] and applies events one at a
//!   time, publishing a fresh [`Snapshot`] after each one
//! - the **poll** task fetches from the source every `poll_interval` (first
//!   fetch immediately) and queues the outcome
//! - the **tick** task queues a liveness re-evaluation every `tick_interval`
//!
//! Because only the engine task touches the state, polls and ticks can never
//! interleave half-way through an update. Once the token is cancelled no
//! further events are applied.
//!
//! ```no_run
//! use std::sync::Arc;
//! use airwatch_core::{HttpSource, Monitor, MonitorConfig};
//!
//! # async fn example() -> airwatch_core::Result<()> {
//! let source = Arc::new(HttpSource::new("http://localhost:5000/api/lectura")?);
//! let handle = Monitor::spawn(source, MonitorConfig::default())?;
//!
//! let mut updates = handle.subscribe();
//! while updates.changed().await.is_ok() {
//!     let snapshot = updates.borrow_and_update().clone();
//!     println!("{:?} ppm, online: {}", snapshot.current_value, snapshot.is_online);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::engine::{Engine, EngineEvent, PollOutcome, Snapshot};
use crate::error::{Error, Result};
use crate::source::ReadingsSource;

/// Failures logged at warn level before going quiet.
const LOUD_FAILURES: u32 = 3;

/// Entry point for starting a monitor.
#[derive(Debug)]
pub struct Monitor;

impl Monitor {
    /// Start monitoring `source` with the system clock.
    pub fn spawn(source: Arc<dyn ReadingsSource>, config: MonitorConfig) -> Result<MonitorHandle> {
        Self::spawn_with_clock(source, config, Arc::new(SystemClock))
    }

    /// Start monitoring `source`, reading "now" from `clock`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_with_clock(
        source: Arc<dyn ReadingsSource>,
        config: MonitorConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<MonitorHandle> {
        config.validate()?;

        let engine = Engine::new(&config, clock.now_utc());
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let refresh = Arc::new(Notify::new());
        let cancel_token = CancellationToken::new();

        info!(
            "Monitoring {} every {:?} (offline after {:?})",
            source.describe(),
            config.poll_interval,
            config.online_threshold
        );

        let tasks = vec![
            tokio::spawn(run_engine(
                engine,
                events_rx,
                snapshot_tx,
                clock,
                cancel_token.clone(),
            )),
            tokio::spawn(run_poller(
                source,
                events_tx.clone(),
                Arc::clone(&refresh),
                config.poll_interval,
                cancel_token.clone(),
            )),
            tokio::spawn(run_ticker(
                events_tx.clone(),
                config.tick_interval,
                cancel_token.clone(),
            )),
        ];

        Ok(MonitorHandle {
            events: events_tx,
            snapshots: snapshot_rx,
            refresh,
            cancel_token,
            tasks,
        })
    }
}

/// Control and observation handle for a running monitor.
///
/// Dropping the handle cancels the monitor.
pub struct MonitorHandle {
    events: mpsc::Sender<EngineEvent>,
    snapshots: watch::Receiver<Snapshot>,
    refresh: Arc<Notify>,
    cancel_token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("cancelled", &self.cancel_token.is_cancelled())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl MonitorHandle {
    /// A receiver that is notified after every applied event.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Snapshots as a stream.
    ///
    /// Yields the current snapshot first, then one per change. Intermediate
    /// snapshots are skipped if the consumer falls behind. The stream ends
    /// when the monitor stops.
    pub fn snapshots(&self) -> impl Stream<Item = Snapshot> + Send + 'static {
        let rx = self.snapshots.clone();
        stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let snapshot = rx.borrow_and_update().clone();
            Some((snapshot, (rx, false)))
        })
    }

    /// Freeze the chart window. Current value and liveness keep updating.
    pub async fn pause(&self) -> Result<()> {
        self.send(EngineEvent::Pause).await
    }

    /// Unfreeze the chart window. It catches up on the next poll.
    pub async fn resume(&self) -> Result<()> {
        self.send(EngineEvent::Resume).await
    }

    /// Pause or resume.
    pub async fn set_paused(&self, paused: bool) -> Result<()> {
        if paused {
            self.pause().await
        } else {
            self.resume().await
        }
    }

    /// Poll now instead of waiting for the next interval.
    ///
    /// The interval restarts from the forced poll.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    /// Stop the monitor. Calling this more than once is harmless.
    pub fn cancel(&self) {
        if !self.cancel_token.is_cancelled() {
            debug!("Cancelling monitor");
        }
        self.cancel_token.cancel();
    }

    /// Whether the monitor has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// A token that cancels this monitor when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Cancel and wait for all background tasks to finish.
    pub async fn shutdown(mut self) {
        self.cancel();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await
                && e.is_panic()
            {
                error!("Monitor task panicked: {}", e);
            }
        }
        debug!("Monitor stopped");
    }

    async fn send(&self, event: EngineEvent) -> Result<()> {
        if self.cancel_token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.events.send(event).await.map_err(|_| Error::Cancelled)
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn run_engine(
    mut engine: Engine,
    mut events: mpsc::Receiver<EngineEvent>,
    snapshots: watch::Sender<Snapshot>,
    clock: Arc<dyn Clock>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("Engine task cancelled");
                break;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                engine.apply(event, clock.now_utc());
                snapshots.send_replace(engine.snapshot());
            }
        }
    }
}

async fn run_poller(
    source: Arc<dyn ReadingsSource>,
    events: mpsc::Sender<EngineEvent>,
    refresh: Arc<Notify>,
    poll_interval: Duration,
    token: CancellationToken,
) {
    let mut timer = interval(poll_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut consecutive_failures = 0u32;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = timer.tick() => {}
            _ = refresh.notified() => {
                debug!("Forced refresh");
                timer.reset();
            }
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = source.fetch() => result,
        };

        match &result {
            Ok(readings) => {
                if consecutive_failures > 0 {
                    info!(
                        "{} recovered after {} failed poll(s)",
                        source.describe(),
                        consecutive_failures
                    );
                }
                consecutive_failures = 0;
                debug!("Polled {} reading(s)", readings.len());
            }
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures <= LOUD_FAILURES {
                    warn!(
                        "Failed to poll {}: {} (attempt {})",
                        source.describe(),
                        e,
                        consecutive_failures
                    );
                } else if consecutive_failures == LOUD_FAILURES + 1 {
                    error!(
                        "Failed to poll {} after {} attempts, will continue trying silently",
                        source.describe(),
                        consecutive_failures
                    );
                }
            }
        }

        let event = EngineEvent::Poll(PollOutcome::from_result(result));
        if events.send(event).await.is_err() {
            debug!("Engine stopped, ending poll loop");
            break;
        }
    }
}

async fn run_ticker(
    events: mpsc::Sender<EngineEvent>,
    tick_interval: Duration,
    token: CancellationToken,
) {
    let mut timer = interval(tick_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = timer.tick() => {
                match events.try_send(EngineEvent::Tick) {
                    // A queued tick already covers this one
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        }
    }
}
