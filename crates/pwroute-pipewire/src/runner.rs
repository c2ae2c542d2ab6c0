//! External command execution.

use std::process::Command;

use tracing::{debug, error, info};

use crate::error::{PwError, PwResult};

/// Runs an external program to completion and returns its standard output.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`.
    ///
    /// Returns stdout with one trailing newline removed. A non-zero exit is
    /// an error carrying the captured stderr.
    fn run(&self, program: &str, args: &[String]) -> PwResult<String>;
}

/// Runs commands on the host via `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    quiet: bool,
}

impl SystemRunner {
    /// Create a runner that logs every invocation at info level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner that only logs invocations at debug level.
    #[must_use]
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> PwResult<String> {
        let command = render_command(program, args);
        if self.quiet {
            debug!(%command, "Running command");
        } else {
            info!(%command, "Running command");
        }

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| PwError::Spawn { program: program.to_string(), source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            error!(%command, status = ?output.status.code(), stderr = %stderr, "Command failed");
            return Err(PwError::CommandFailed { command, status: output.status.code(), stderr });
        }

        let mut stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.ends_with('\n') {
            stdout.pop();
        }
        Ok(stdout)
    }
}

pub(crate) fn render_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
