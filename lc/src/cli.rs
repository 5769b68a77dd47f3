//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// LoadCoord - loading-state coordinator
#[derive(Parser)]
#[command(
    name = "lc",
    about = "Replay and inspect multi-source loading-state scenarios",
    version,
    after_help = "Logs are written to: ~/.local/share/loadcoord/logs/loadcoord.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a scenario file against a fresh store
    Run {
        /// Scenario YAML file
        scenario: PathBuf,

        /// Append every loading event to this JSONL file
        #[arg(long)]
        event_log: Option<PathBuf>,

        /// Report format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run the built-in demo scenario
    Demo {
        /// Append every loading event to this JSONL file
        #[arg(long)]
        event_log: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,

    /// Replay a JSONL event log
    Events {
        /// Event log file
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for reports
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

/// Where the log file lives
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("loadcoord")
        .join("logs")
        .join("loadcoord.log")
}
