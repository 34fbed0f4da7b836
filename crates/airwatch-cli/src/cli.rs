//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "airwatch")]
#[command(author, version, about = "Live monitor for a polled air-quality sensor", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = "AIRWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output (also honors NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Poll the source once and print the result
    Once {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Number of latest readings to list
        #[arg(short = 'n', long)]
        latest: Option<usize>,
    },

    /// Continuously monitor the source, printing one line per update
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        monitor: MonitorArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Also print a line on every liveness tick, not only on polls
        #[arg(long)]
        every_tick: bool,
    },

    /// Open the interactive terminal dashboard
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        monitor: MonitorArgs,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Where to read from
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Readings endpoint URL, or use AIRWATCH_URL env var
    #[arg(short, long, env = "AIRWATCH_URL")]
    pub url: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(short = 'T', long)]
    pub timeout: Option<u64>,
}

/// Monitor overrides
#[derive(Debug, Clone, Args)]
pub struct MonitorArgs {
    /// Seconds between polls
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Seconds without a new reading before the device counts as offline
    #[arg(long)]
    pub offline_after: Option<u64>,

    /// Number of readings kept in the chart window
    #[arg(short, long)]
    pub window: Option<usize>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch_overrides() {
        let cli = Cli::try_parse_from([
            "airwatch",
            "watch",
            "--url",
            "http://sensor.local/api/lectura",
            "--interval",
            "2",
            "--offline-after",
            "10",
            "-w",
            "50",
        ])
        .unwrap();

        match cli.command {
            Commands::Watch {
                source, monitor, ..
            } => {
                assert_eq!(source.url.as_deref(), Some("http://sensor.local/api/lectura"));
                assert_eq!(monitor.interval, Some(2));
                assert_eq!(monitor.offline_after, Some(10));
                assert_eq!(monitor.window, Some(50));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_once_json() {
        let cli = Cli::try_parse_from(["airwatch", "once", "-f", "json", "-n", "3"]).unwrap();
        match cli.command {
            Commands::Once { format, latest, .. } => {
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(latest, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        let result = Cli::try_parse_from(["airwatch", "-v", "-q", "config", "path"]);
        assert!(result.is_err());
    }
}
