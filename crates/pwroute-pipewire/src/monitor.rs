//! PipeWire graph monitoring.
//!
//! Runs `pw-mon` as a child process and reads its output on a dedicated
//! thread. Every line is a sign that the graph changed; the callback is
//! invoked for a line only when the minimum interval has passed since the
//! previous invocation, so bursts collapse into a single notification.

use std::io::{BufRead, BufReader};
use std::os::unix::process::CommandExt;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::client::ToolPaths;
use crate::error::{PwError, PwResult};
use crate::runner::render_command;

/// Minimum time between two callback invocations.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(10);

/// Watches the PipeWire graph for changes.
pub struct GraphWatcher {
    program: String,
    args: Vec<String>,
    interval: Duration,
    /// Running monitor process, if any
    monitor: Mutex<Option<Child>>,
}

impl GraphWatcher {
    /// Create a watcher running `pw-mon --no-colors`.
    #[must_use]
    pub fn new(tools: &ToolPaths) -> Self {
        Self::with_command(tools.pw_mon.clone(), ["--no-colors"])
    }

    /// Create a watcher running an arbitrary line-printing command.
    #[must_use]
    pub fn with_command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            interval: DEFAULT_INTERVAL,
            monitor: Mutex::new(None),
        }
    }

    /// Set the minimum time between two callback invocations.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start the monitor and call `callback` when the graph changes.
    ///
    /// The callback runs on the monitor thread.
    pub fn watch<F>(&self, callback: F) -> PwResult<()>
    where
        F: FnMut() + Send + 'static,
    {
        let mut slot = self.monitor.lock();
        if let Some(previous) = slot.as_mut() {
            match previous.try_wait() {
                Ok(None) => return Err(PwError::AlreadyWatching),
                Ok(Some(status)) => debug!(%status, "Previous monitor exited, restarting"),
                Err(e) => {
                    warn!(error = %e, "Failed to poll previous monitor, replacing it");
                    stop(previous);
                }
            }
            *slot = None;
        }

        let command = render_command(&self.program, &self.args);
        info!(%command, "Starting graph monitor");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            // Keep terminal signals away from the monitor; unwatch owns its lifetime
            .process_group(0)
            .spawn()
            .map_err(|source| PwError::Spawn { program: self.program.clone(), source })?;

        let Some(stdout) = child.stdout.take() else {
            stop(&mut child);
            return Err(PwError::Io(std::io::Error::other("monitor stdout was not captured")));
        };

        let interval = self.interval;
        let spawned = std::thread::Builder::new()
            .name("pw-monitor".to_string())
            .spawn(move || read_events(stdout, interval, callback));

        if let Err(e) = spawned {
            stop(&mut child);
            return Err(e.into());
        }

        *slot = Some(child);
        Ok(())
    }

    /// Stop the monitor. Does nothing when not watching.
    pub fn unwatch(&self) {
        if let Some(mut child) = self.monitor.lock().take() {
            info!("Stopping graph monitor");
            stop(&mut child);
        }
    }

    /// Check if a monitor process is running.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.monitor
            .lock()
            .as_mut()
            .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
    }
}

impl Drop for GraphWatcher {
    fn drop(&mut self) {
        self.unwatch();
    }
}

fn stop(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "Monitor already exited");
    }
    if let Err(e) = child.wait() {
        warn!(error = %e, "Failed to reap monitor process");
    }
}

/// Read monitor output until EOF, throttling the callback.
fn read_events<F: FnMut()>(stdout: ChildStdout, interval: Duration, mut callback: F) {
    let mut last_call = Instant::now();

    for line in BufReader::new(stdout).split(b'\n') {
        if let Err(e) = line {
            warn!(error = %e, "Failed to read monitor output");
            break;
        }

        let elapsed = last_call.elapsed();
        if elapsed > interval {
            debug!(?elapsed, "Graph changed, executing callback");
            last_call = Instant::now();
            callback();
        } else {
            trace!(?elapsed, "Graph change inside interval, skipped");
        }
    }

    info!("Graph monitor output closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::sleep;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if done() {
                return true;
            }
            sleep(Duration::from_millis(10));
        }
        done()
    }

    #[test]
    fn test_callback_fires_on_spaced_lines() {
        let watcher = GraphWatcher::with_command(
            "sh",
            ["-c", "for i in 1 2 3 4 5; do echo added $i; sleep 0.05; done; exec sleep 10"],
        );
        let (count, callback) = counter();

        watcher.watch(callback).unwrap();
        assert!(watcher.is_watching());
        assert!(wait_until(Duration::from_secs(5), || count.load(Ordering::SeqCst) >= 3));

        watcher.unwatch();
        assert!(!watcher.is_watching());
    }

    #[test]
    fn test_burst_collapses_to_one_callback() {
        let watcher = GraphWatcher::with_command(
            "sh",
            ["-c", "sleep 0.3; for i in $(seq 1 100); do echo changed; done; exec sleep 10"],
        )
        .with_interval(Duration::from_millis(200));
        let (count, callback) = counter();

        watcher.watch(callback).unwrap();
        assert!(wait_until(Duration::from_secs(5), || count.load(Ordering::SeqCst) >= 1));
        sleep(Duration::from_millis(100));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        watcher.unwatch();
    }

    #[test]
    fn test_second_watch_is_rejected() {
        let watcher = GraphWatcher::with_command("sh", ["-c", "exec sleep 10"]);

        watcher.watch(|| {}).unwrap();
        assert_matches!(watcher.watch(|| {}), Err(PwError::AlreadyWatching));

        watcher.unwatch();
        watcher.watch(|| {}).unwrap();
        watcher.unwatch();
    }

    #[test]
    fn test_unwatch_when_idle_is_noop() {
        let watcher = GraphWatcher::new(&ToolPaths::default());
        watcher.unwatch();
        assert!(!watcher.is_watching());
    }

    #[test]
    fn test_exited_monitor_is_not_watching() {
        let watcher = GraphWatcher::with_command("sh", ["-c", "sleep 0.05; echo done"]);

        watcher.watch(|| {}).unwrap();
        assert!(wait_until(Duration::from_secs(5), || !watcher.is_watching()));

        // A monitor that died on its own can be restarted without unwatch
        let (count, callback) = counter();
        watcher.watch(callback).unwrap();
        assert!(wait_until(Duration::from_secs(5), || count.load(Ordering::SeqCst) == 1));
        watcher.unwatch();
    }

    #[test]
    fn test_missing_monitor_binary() {
        let watcher = GraphWatcher::with_command("pwroute-no-such-monitor", Vec::<String>::new());

        assert_matches!(watcher.watch(|| {}), Err(PwError::Spawn { .. }));
        assert!(!watcher.is_watching());
    }
}
