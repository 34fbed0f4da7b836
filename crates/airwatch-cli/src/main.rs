use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod format;
mod tui;

use airwatch_core::Thresholds;
use cli::{Cli, Commands, OutputFormat};
use commands::{OnceArgs, WatchArgs, cmd_config, cmd_once, cmd_watch};
use config::{Config, default_config_path};
use format::FormatOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // Log lines would tear the dashboard's alternate screen
    if matches!(cli.command, Commands::Dashboard { .. }) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    tracing::debug!("Using config: {}", config_path.display());

    let no_color = cli.no_color
        || config.display.no_color
        || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());

    match cli.command {
        Commands::Once {
            source,
            format,
            latest,
        } => {
            config.apply_source_args(&source);
            config.validate()?;
            let opts = format_options(&config, no_color, latest);
            cmd_once(OnceArgs {
                config: &config,
                format,
                opts: &opts,
            })
            .await?;
        }
        Commands::Watch {
            source,
            monitor,
            format,
            every_tick,
        } => {
            config.apply_source_args(&source);
            config.apply_monitor_args(&monitor);
            config.validate()?;
            // One JSON document per line
            let opts = format_options(&config, no_color, None)
                .with_compact(matches!(format, OutputFormat::Json));
            cmd_watch(WatchArgs {
                config: &config,
                format,
                every_tick,
                opts: &opts,
            })
            .await?;
        }
        Commands::Dashboard { source, monitor } => {
            config.apply_source_args(&source);
            config.apply_monitor_args(&monitor);
            config.validate()?;
            let opts = format_options(&config, no_color, None);
            tui::run(&config, &opts).await?;
        }
        Commands::Config { action } => {
            cmd_config(action, &config_path, &config)?;
        }
    }

    Ok(())
}

fn format_options(config: &Config, no_color: bool, latest: Option<usize>) -> FormatOptions {
    FormatOptions::new(no_color, latest.unwrap_or(config.display.latest_count))
        .with_thresholds(Thresholds::new(config.thresholds))
}
