//! Command implementations for the CLI.

mod config;
mod once;
mod watch;

pub use config::cmd_config;
pub use once::{OnceArgs, cmd_once};
pub use watch::{WatchArgs, cmd_watch};

use anyhow::{Context, Result};
use airwatch_core::HttpSource;

use crate::config::Config;

/// Build the HTTP source described by `config`.
pub(crate) fn http_source(config: &Config) -> Result<HttpSource> {
    HttpSource::with_timeout(&config.source.url, config.request_timeout())
        .with_context(|| format!("Cannot use source URL '{}'", config.source.url))
}
