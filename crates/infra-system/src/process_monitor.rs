// Process Monitor
// One task per supervised process: drain output, reap, notify exactly once

use crate::output_tail::OutputTail;
use netgate_core::application::constants::EXIT_OUTPUT_TAIL_CHARS;
use netgate_core::application::execute_guarded;
use netgate_core::domain::{ExitCallback, ProcessExit, ProcessHandle};
use std::process::ExitStatus;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Owns every monitor task so shutdown can join them deterministically
#[derive(Default)]
pub struct ProcessMonitor {
    tasks: Mutex<JoinSet<()>>,
}

impl ProcessMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a live child and supervise it until exit
    pub fn supervise(
        &self,
        name: &str,
        child: Child,
        on_exit: Option<ExitCallback>,
    ) -> ProcessHandle {
        let pid = child.id().unwrap_or_default();
        let (exit_tx, exit_rx) = watch::channel(None);
        let handle = ProcessHandle::new(name, pid, exit_rx);

        let name = name.to_string();
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        // Reap finished monitors so the set stays small
        while tasks.try_join_next().is_some() {}
        tasks.spawn(monitor_process(name, child, on_exit, exit_tx));

        handle
    }

    /// Number of monitor tasks not yet reaped
    pub fn active(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        while tasks.try_join_next().is_some() {}
        tasks.len()
    }

    /// Join every monitor, aborting those still running after `timeout`
    pub async fn shutdown(&self, timeout: Duration) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(|p| p.into_inner()));
        let pending = tasks.len();

        let joined = tokio::time::timeout(timeout, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if joined.is_err() {
            warn!(pending = tasks.len(), "Aborting process monitors still running");
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }
        info!(monitors = pending, "Process monitors joined");
    }
}

async fn monitor_process(
    name: String,
    mut child: Child,
    on_exit: Option<ExitCallback>,
    exit_tx: watch::Sender<Option<ProcessExit>>,
) {
    let mut tail = OutputTail::new(EXIT_OUTPUT_TAIL_CHARS);
    let stdout = child.stdout.take().map(BufReader::new);
    let stderr = child.stderr.take().map(BufReader::new);
    drain_output(&name, stdout, stderr, &mut tail).await;

    let exit = match child.wait().await {
        Ok(status) => {
            let exit = ProcessExit {
                code: exit_code(&status),
            };
            if !exit.success() {
                error!(process = %name, exit_code = exit.code, output = %tail.as_str(), "{} output", name);
            }
            exit
        }
        Err(e) => {
            error!(process = %name, error = %e, "{} died", name);
            ProcessExit { code: -1 }
        }
    };

    info!(process = %name, exit_code = exit.code, "{} exited", name);
    let _ = exit_tx.send(Some(exit));

    if let Some(callback) = on_exit {
        let outcome = execute_guarded(move || callback(exit))
            .into_result(|msg| format!("panicked: {}", msg))
            .and_then(|r| r.map_err(|e| e.to_string()));
        if let Err(e) = outcome {
            error!(process = %name, error = %e, "failed to execute on_exit hook for {}", name);
        }
    }
}

/// Read stdout and stderr as one interleaved stream until both close
async fn drain_output<O, E>(name: &str, stdout: Option<O>, stderr: Option<E>, tail: &mut OutputTail)
where
    O: AsyncBufRead + Unpin,
    E: AsyncBufRead + Unpin,
{
    let mut stdout = stdout;
    let mut stderr = stderr;

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            line = next_line(&mut stdout), if stdout.is_some() => match line {
                Some(line) => {
                    debug!(process = %name, "{}", line.trim_end());
                    tail.push(&line);
                }
                None => stdout = None,
            },
            line = next_line(&mut stderr), if stderr.is_some() => match line {
                Some(line) => {
                    debug!(process = %name, "{}", line.trim_end());
                    tail.push(&line);
                }
                None => stderr = None,
            },
        }
    }
}

async fn next_line<R: AsyncBufRead + Unpin>(reader: &mut Option<R>) -> Option<String> {
    let reader = reader.as_mut()?;
    let mut buf = Vec::new();
    match reader.read_until(b'\n', &mut buf).await {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(String::from_utf8_lossy(&buf).into_owned()),
    }
}

/// Exit code with signal deaths reported as `-signal`
pub(crate) fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

#[cfg(test)]
mod tests {
    use super::*;
    use netgate_core::domain::CallbackError;
    use std::process::Stdio;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::process::Command;

    fn spawn_sh(script: &str) -> Child {
        Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap()
    }

    fn counting_callback(counter: Arc<AtomicUsize>, fail: bool) -> ExitCallback {
        Box::new(move |_exit| {
            counter.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err(CallbackError("cleanup refused".to_string()))
            } else {
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_reports_exit_code_and_calls_back_once() {
        let monitor = ProcessMonitor::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let handle = monitor.supervise(
            "dns",
            spawn_sh("echo resolving; echo oops >&2; exit 3"),
            Some(counting_callback(counter.clone(), false)),
        );

        assert_eq!(handle.wait().await, Some(ProcessExit { code: 3 }));
        monitor.shutdown(Duration::from_secs(5)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_callback_is_absorbed() {
        let monitor = ProcessMonitor::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let handle = monitor.supervise(
            "proxy",
            spawn_sh("exit 0"),
            Some(counting_callback(counter.clone(), true)),
        );

        assert_eq!(handle.wait().await, Some(ProcessExit { code: 0 }));
        monitor.shutdown(Duration::from_secs(5)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_callback_is_absorbed() {
        let monitor = ProcessMonitor::new();
        let panicking: ExitCallback = Box::new(|_exit| panic!("hook exploded"));
        let survivor = Arc::new(AtomicUsize::new(0));

        monitor.supervise("scrambler", spawn_sh("exit 1"), Some(panicking));
        let other = monitor.supervise(
            "lan",
            spawn_sh("sleep 0.2"),
            Some(counting_callback(survivor.clone(), false)),
        );

        assert_eq!(other.wait().await, Some(ProcessExit { code: 0 }));
        monitor.shutdown(Duration::from_secs(5)).await;
        assert_eq!(survivor.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_signal_death_is_negative_code() {
        let monitor = ProcessMonitor::new();
        let handle = monitor.supervise("wifi", spawn_sh("kill -9 $$"), None);

        assert_eq!(handle.wait().await, Some(ProcessExit { code: -9 }));
    }

    #[tokio::test]
    async fn test_large_output_does_not_block_exit() {
        let monitor = ProcessMonitor::new();
        let handle = monitor.supervise(
            "shortcut",
            spawn_sh("i=0; while [ $i -lt 5000 ]; do echo line-$i-padding-padding-padding; i=$((i+1)); done; exit 2"),
            None,
        );

        assert_eq!(handle.wait().await, Some(ProcessExit { code: 2 }));
    }

    #[tokio::test]
    async fn test_shutdown_aborts_stuck_monitors() {
        let monitor = ProcessMonitor::new();
        let mut child = Command::new("sleep");
        child.arg("30").kill_on_drop(true);
        monitor.supervise("stuck", child.spawn().unwrap(), None);

        assert_eq!(monitor.active(), 1);
        monitor.shutdown(Duration::from_millis(50)).await;
        assert_eq!(monitor.active(), 0);
    }
}
