//! Execution result types

/// Exit code reported when a command cannot be spawned
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code reported when a command exceeds its timeout
pub const EXIT_TIMED_OUT: i32 = 124;

/// Outcome of one external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful run with no output
    pub fn ok() -> Self {
        Self {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Failed run with the given exit code and stderr
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Trimmed stderr, as shown in log lines and error messages
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}
