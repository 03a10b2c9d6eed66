//! Run the external package-manager command.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// How a command run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandOutcome {
    /// True only on a zero exit status
    pub success: bool,
    /// Exit code, if the process ran to completion
    pub exit_code: Option<i32>,
}

impl CommandOutcome {
    pub fn failed_to_launch() -> Self {
        Self {
            success: false,
            exit_code: None,
        }
    }

    pub fn from_code(code: Option<i32>) -> Self {
        Self {
            success: code == Some(0),
            exit_code: code,
        }
    }
}

/// Trait for running the external command
///
/// Implementations must never fail: launch errors and non-zero exits are both
/// reported through [`CommandOutcome`] so the caller can always restore.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, cwd: Option<&Path>, program: &str, args: &[String]) -> CommandOutcome;
}

/// Where the child's stdout/stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdioMode {
    /// Pass through the caller's streams
    #[default]
    Inherit,
    /// Discard output
    Null,
}

/// Runs the command as a real child process
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    stdio: StdioMode,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that discards the command's output
    pub fn quiet() -> Self {
        Self {
            stdio: StdioMode::Null,
        }
    }

    fn output_stdio(&self) -> Stdio {
        match self.stdio {
            StdioMode::Inherit => Stdio::inherit(),
            StdioMode::Null => Stdio::null(),
        }
    }
}

/// Look the program up on PATH so `npm` resolves to `npm.cmd` on Windows
fn resolve_program(program: &str) -> PathBuf {
    which::which(program).unwrap_or_else(|_| PathBuf::from(program))
}

/// Exit code, or `128 + signal` for a child killed by a signal (shell convention)
fn exit_code(status: &std::process::ExitStatus) -> Option<i32> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(128 + signal);
        }
    }
    status.code()
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, cwd: Option<&Path>, program: &str, args: &[String]) -> CommandOutcome {
        let resolved = resolve_program(program);
        info!("Executing {} {}", program, args.join(" "));
        debug!("Resolved {} to {}", program, resolved.display());

        let mut cmd = Command::new(&resolved);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(self.output_stdio())
            .stderr(self.output_stdio());
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }

        match cmd.status().await {
            Ok(status) => {
                let outcome = CommandOutcome::from_code(exit_code(&status));
                if !outcome.success {
                    warn!("The command {} exited with {}", program, status);
                }
                outcome
            }
            Err(e) => {
                warn!("Failed to launch {}: {}", program, e);
                CommandOutcome::failed_to_launch()
            }
        }
    }
}
