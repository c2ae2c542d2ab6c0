//! PipeWire error types.

use thiserror::Error;

/// PipeWire error type.
#[derive(Debug, Error)]
pub enum PwError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` failed ({}): {stderr}", exit_label(.status.as_ref()))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Unexpected output on line {line}: {reason} ({content:?})")]
    Parse {
        line: usize,
        content: String,
        reason: &'static str,
    },

    #[error("Graph monitor is already running")]
    AlreadyWatching,

    #[error("Monitor I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(status: Option<&i32>) -> String {
    status.map_or_else(|| "killed by signal".to_string(), |code| format!("exit code {code}"))
}

impl PwError {
    pub(crate) fn parse(line: usize, content: &str, reason: &'static str) -> Self {
        Self::Parse { line, content: content.to_string(), reason }
    }
}

/// Result type for PipeWire operations.
pub type PwResult<T> = Result<T, PwError>;
