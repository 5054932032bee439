//! Command-line argument parsing for the watchdog

use clap::Parser;
use std::path::PathBuf;

/// Memory + model watchdog for a local model-serving service
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "modelwatchdog")]
#[command(version)]
#[command(about = "Memory + model watchdog", long_about = None)]
pub struct Args {
    /// Config file path (JSON, or TOML with a .toml extension)
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Print actions without changing the system
    #[arg(long)]
    pub dry_run: bool,

    /// Verbosity: -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
