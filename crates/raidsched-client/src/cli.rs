//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use raidsched_core::{TracingConfig, TracingOutputFormat};

/// raidsched - keep Discord scheduled events in line with the raid sheet
#[derive(Debug, Parser)]
#[command(name = "raidsched")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "RAIDSCHED_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log as an unattended scheduled job (JSON lines)
    #[arg(long, env = "RAIDSCHED_BATCH", global = true)]
    pub batch: bool,

    /// Log format: pretty, compact or json
    #[arg(long, env = "RAIDSCHED_LOG_FORMAT", global = true)]
    pub log_format: Option<TracingOutputFormat>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Tracing setup selected by the global flags.
    ///
    /// `--debug` wins over `--batch`; `--log-format` overrides either.
    pub fn tracing_config(&self) -> TracingConfig {
        let config = if self.debug {
            TracingConfig::debug()
        } else if self.batch {
            TracingConfig::batch()
        } else {
            TracingConfig::default()
        };
        match self.log_format {
            Some(format) => config.with_format(format),
            None => config,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile events, announce today's, prune stale ones and export the calendar (default)
    Run,

    /// Show what a run would do without changing anything
    Plan {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Only re-export the calendar from the current events
    Export,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
