//! Signal handling for graceful shutdown.

use anyhow::{Context, Result};
use tokio::signal::unix::{SignalKind, signal};
use tracing::info;

/// Wait for SIGTERM or SIGINT (Ctrl+C).
///
/// Resolves with the name of the signal received.
pub async fn shutdown_signal() -> Result<&'static str> {
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    let name = tokio::select! {
        _ = terminate.recv() => "SIGTERM",
        res = tokio::signal::ctrl_c() => {
            res.context("Failed to listen for Ctrl+C")?;
            "SIGINT"
        }
    };

    info!(signal = name, "Received shutdown signal");
    Ok(name)
}
