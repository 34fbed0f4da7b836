//! One-shot poll command.
//!
//! A failed poll prints the same offline snapshot an empty response would,
//! then exits non-zero so scripts can tell the two apart.

use anyhow::{Result, bail};
use airwatch_core::{Clock, Engine, PollOutcome, ReadingsSource, SystemClock};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::{FormatOptions, format_snapshot_json, format_snapshot_text};

use super::http_source;

/// Arguments for the once command.
pub struct OnceArgs<'a> {
    pub config: &'a Config,
    pub format: OutputFormat,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_once(args: OnceArgs<'_>) -> Result<()> {
    let OnceArgs {
        config,
        format,
        opts,
    } = args;

    let source = http_source(config)?;
    let monitor = config.monitor_config();
    let clock = SystemClock;

    let mut engine = Engine::new(&monitor, clock.now_utc());
    let result = source.fetch().await;
    let failure = result.as_ref().err().map(ToString::to_string);
    engine.on_poll_result(PollOutcome::from_result(result), clock.now_utc());
    let snapshot = engine.snapshot();

    let content = match format {
        OutputFormat::Json => format_snapshot_json(&snapshot, opts)?,
        OutputFormat::Text => format_snapshot_text(&snapshot, opts),
    };
    print!("{}", content);

    if let Some(e) = failure {
        bail!("Failed to poll {}: {}", source.url(), e);
    }
    Ok(())
}
