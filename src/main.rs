//! Model watchdog - CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use modelwatchdog::{cli::Args, logging, Capabilities, Supervisor, WatchdogConfig};
use std::process::ExitCode;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if !args.config.exists() {
        eprintln!(
            "{}",
            format!("config not found: {}", args.config.display()).red()
        );
        return ExitCode::from(2);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = WatchdogConfig::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    logging::init(&config.log_file, args.verbose);
    if args.dry_run {
        info!("dry-run mode: commands and webhook posts are logged, not executed");
    }

    let caps = Capabilities::system(args.dry_run);
    let mut supervisor = Supervisor::new(&config, caps)?;

    tokio::select! {
        _ = supervisor.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("watchdog stopped");
        }
    }

    Ok(())
}
