//! Watch command implementation.
//!
//! Runs a [`Monitor`] in the background and prints a line whenever a poll
//! completes or the device changes between online and offline.

use std::sync::Arc;

use anyhow::Result;
use airwatch_core::{Monitor, Snapshot};
use owo_colors::OwoColorize;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::{FormatOptions, format_snapshot_json, format_watch_line};

use super::http_source;

/// Arguments for the watch command.
pub struct WatchArgs<'a> {
    pub config: &'a Config,
    pub format: OutputFormat,
    pub every_tick: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_watch(args: WatchArgs<'_>) -> Result<()> {
    let WatchArgs {
        config,
        format,
        every_tick,
        opts,
    } = args;

    let source = Arc::new(http_source(config)?);
    let monitor = config.monitor_config();

    let header = if opts.no_color {
        format!("Watching: {}", source.url())
    } else {
        format!("Watching: {}", source.url().cyan())
    };
    eprintln!("{}", header);
    eprintln!(
        "Interval: {}s | Offline after: {}s | Press Ctrl+C to stop",
        monitor.poll_interval.as_secs(),
        monitor.online_threshold.as_secs()
    );
    eprintln!("{}", "-".repeat(50));

    let handle = Monitor::spawn(source, monitor)?;
    let mut updates = handle.subscribe();
    let mut previous: Option<Snapshot> = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                eprintln!("\nShutting down...");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if every_tick || is_notable(previous.as_ref(), &snapshot) {
                    let line = match format {
                        OutputFormat::Json => format_snapshot_json(&snapshot, opts)?,
                        OutputFormat::Text => format!("{}\n", format_watch_line(&snapshot, opts)),
                    };
                    print!("{}", line);
                }
                previous = Some(snapshot);
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

/// Whether `next` is worth printing after `previous`.
///
/// Ticks that only age the last reading are skipped unless they flip liveness.
fn is_notable(previous: Option<&Snapshot>, next: &Snapshot) -> bool {
    let Some(previous) = previous else {
        return next.stats.last_poll_at.is_some();
    };
    previous.stats.last_poll_at != next.stats.last_poll_at
        || previous.is_online != next.is_online
        || previous.paused != next.paused
}
