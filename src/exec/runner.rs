//! External command execution
//!
//! Commands are argv arrays and never go through a shell. Every run is
//! bounded by its timeout; a timed-out child is killed.

use crate::exec::template::shell_quote;
use crate::exec::types::{CommandOutput, EXIT_NOT_FOUND, EXIT_TIMED_OUT};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

/// Runs external commands on behalf of probes, recovery and notifications
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv` to completion or until `limit` elapses
    async fn run(&self, argv: &[String], limit: Duration) -> CommandOutput;
}

/// Runs commands on the host
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, argv: &[String], limit: Duration) -> CommandOutput {
        let (program, args) = match argv.split_first() {
            Some(split) => split,
            None => return CommandOutput::failed(EXIT_NOT_FOUND, "empty command"),
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("running command: {}", pretty(argv));

        match timeout(limit, cmd.output()).await {
            Ok(Ok(output)) => {
                let result = CommandOutput {
                    // Killed by a signal: no exit code
                    exit_code: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };
                debug!(
                    "command finished rc={} stdout={} stderr={}",
                    result.exit_code,
                    result.stdout.trim(),
                    result.stderr.trim()
                );
                result
            }
            Ok(Err(e)) => CommandOutput::failed(EXIT_NOT_FOUND, e.to_string()),
            Err(_) => CommandOutput::failed(
                EXIT_TIMED_OUT,
                format!("Command timed out after {}s", limit.as_secs()),
            ),
        }
    }
}

/// Logs every command instead of running it and reports success
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner;

impl DryRunRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, argv: &[String], _limit: Duration) -> CommandOutput {
        info!("[DRY-RUN] command: {}", pretty(argv));
        CommandOutput::ok()
    }
}

/// Shell-quoted rendering of an argv for log lines
pub fn pretty(argv: &[String]) -> String {
    argv.iter()
        .map(|part| shell_quote(part))
        .collect::<Vec<_>>()
        .join(" ")
}
