//! `pwroute watch`: print link changes until interrupted.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use pwroute_pipewire::{CommandRunner, GraphWatcher, LinkTable, PipeWire, SystemRunner};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::commands::format_changes;
use crate::config::Config;
use crate::signals;

/// Run the watch loop on a fresh runtime.
pub fn run(config: &Config, pw: PipeWire<SystemRunner>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let watcher = GraphWatcher::new(pw.tools()).with_interval(config.watch.interval());
    let mut stdout = std::io::stdout();
    runtime.block_on(watch_links(Arc::new(pw), &watcher, signals::shutdown_signal(), &mut stdout))
}

/// Print link changes to `out` until `shutdown` resolves or the monitor exits.
async fn watch_links<R, S>(
    pw: Arc<PipeWire<R>>,
    watcher: &GraphWatcher,
    shutdown: S,
    out: &mut impl Write,
) -> Result<()>
where
    R: CommandRunner + 'static,
    S: Future<Output = Result<&'static str>>,
{
    let mut links = list_links(&pw).await.context("Failed to list links")?;
    writeln!(out, "Watching {} links. Press Ctrl+C to stop.", links.len())
        .context("Failed to write output")?;

    // Capacity 1: changes that arrive while a listing is pending merge into it
    let (change_tx, mut change_rx) = mpsc::channel::<()>(1);
    watcher
        .watch(move || {
            let _ = change_tx.try_send(());
        })
        .context("Failed to start pw-mon")?;

    tokio::pin!(shutdown);

    let result = loop {
        tokio::select! {
            biased;

            signal = &mut shutdown => {
                match signal {
                    Ok(name) => {
                        info!(signal = name, "Stopping watch");
                        break Ok(());
                    }
                    Err(e) => break Err(e),
                }
            }

            change = change_rx.recv() => {
                if change.is_none() {
                    break Err(anyhow::anyhow!("pw-mon exited unexpectedly"));
                }

                match list_links(&pw).await {
                    Ok(latest) => {
                        let changes = links.diff(&latest);
                        debug!(
                            added = changes.added.len(),
                            removed = changes.removed.len(),
                            "Links re-listed"
                        );
                        if let Err(e) = write_lines(out, &format_changes(&changes)) {
                            break Err(anyhow::Error::new(e).context("Failed to write output"));
                        }
                        links = latest;
                    }
                    Err(e) => warn!(error = %e, "Failed to re-list links"),
                }
            }
        }
    };

    watcher.unwatch();
    result
}

fn write_lines(out: &mut impl Write, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

/// List links without blocking the runtime.
async fn list_links<R: CommandRunner + 'static>(pw: &Arc<PipeWire<R>>) -> Result<LinkTable> {
    let pw = Arc::clone(pw);
    match tokio::task::spawn_blocking(move || pw.list_links()).await {
        Ok(listing) => Ok(listing?),
        Err(e) => bail!("Link listing task failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockRunner;
    use mockall::Sequence;
    use pwroute_pipewire::ToolPaths;

    const BEFORE: &str = "  76 Firefox:output_FL\n 104   |->   47 speakers:playback_FL";
    const AFTER: &str = "  76 Firefox:output_FL\n 110   |->   49 speakers:playback_FR";

    fn runner_listing(listings: [&'static str; 2]) -> MockRunner {
        let mut runner = MockRunner::new();
        let mut seq = Sequence::new();
        for listing in listings {
            runner
                .expect_run()
                .withf(|p: &str, args: &[String]| p == "pw-link" && args == ["--links", "--id"])
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _| Ok(listing.to_string()));
        }
        runner
    }

    #[tokio::test]
    async fn test_change_prints_link_diff() {
        let pw = Arc::new(PipeWire::with_runner(runner_listing([BEFORE, AFTER]), ToolPaths::default()));
        let watcher = GraphWatcher::with_command("sh", ["-c", "sleep 0.2; echo changed"]);
        let mut out = Vec::new();

        let err = watch_links(pw, &watcher, std::future::pending(), &mut out).await.unwrap_err();

        assert!(err.to_string().contains("pw-mon exited unexpectedly"));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Watching 1 links. Press Ctrl+C to stop.\n\
             - link 104: 76 -> 47 speakers:playback_FL\n\
             + link 110: 76 -> 49 speakers:playback_FR\n"
        );
        assert!(!watcher.is_watching());
    }

    #[tokio::test]
    async fn test_shutdown_stops_monitor() {
        let mut runner = MockRunner::new();
        runner.expect_run().times(1).returning(|_, _| Ok(BEFORE.to_string()));
        let pw = Arc::new(PipeWire::with_runner(runner, ToolPaths::default()));
        let watcher = GraphWatcher::with_command("sh", ["-c", "exec sleep 10"]);
        let mut out = Vec::new();

        watch_links(pw, &watcher, async { Ok("SIGTERM") }, &mut out).await.unwrap();

        assert!(!watcher.is_watching());
        assert_eq!(String::from_utf8(out).unwrap(), "Watching 1 links. Press Ctrl+C to stop.\n");
    }
}
