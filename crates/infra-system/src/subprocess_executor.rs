// Subprocess executor implementation
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

use netgate_core::application::constants::SPAWN_GRACE_PERIOD;
use netgate_core::domain::{EscalationSwitch, ExitCallback, ProcessHandle};
use netgate_core::port::{CommandExecutor, ExecutionError, StartupError};

use crate::process_monitor::{exit_code, ProcessMonitor};

/// Shell used as the privilege-escalation channel
pub const DEFAULT_ESCALATION_SHELL: &str = "su";

const SHELL_METACHARACTERS: &[char] = &[
    ';', '&', '|', '<', '>', '$', '`', '\\', '"', '\'', '(', ')', '*', '?', '[', ']', '#', '~',
];

/// Subprocess executor
/// Runs commands directly, or through an escalation shell while the
/// process-wide switch is on
pub struct SubprocessExecutor {
    escalation: EscalationSwitch,
    monitor: Arc<ProcessMonitor>,
    escalation_shell: String,
    grace_period: Duration,
}

impl SubprocessExecutor {
    /// Create a new subprocess executor
    ///
    /// # Arguments
    /// * `escalation` - Process-wide escalation switch, consulted per call
    /// * `monitor` - Monitor that takes ownership of spawned helpers
    pub fn new(escalation: EscalationSwitch, monitor: Arc<ProcessMonitor>) -> Self {
        Self {
            escalation,
            monitor,
            escalation_shell: DEFAULT_ESCALATION_SHELL.to_string(),
            grace_period: SPAWN_GRACE_PERIOD,
        }
    }

    pub fn with_escalation_shell(mut self, shell: impl Into<String>) -> Self {
        self.escalation_shell = shell.into();
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn monitor(&self) -> &Arc<ProcessMonitor> {
        &self.monitor
    }

    /// Script written to the escalation shell: the joined command line, then exit.
    ///
    /// Joining with single spaces drops argument boundaries; that contract is
    /// kept as is and only flagged in the log.
    fn escalation_script(args: &[String]) -> String {
        for arg in args {
            if arg.is_empty()
                || arg.chars().any(char::is_whitespace)
                || arg.contains(SHELL_METACHARACTERS)
            {
                warn!(argument = %arg, "Argument will be re-split by the escalation shell");
            }
        }
        format!("{}\nexit\n", args.join(" "))
    }

    /// Spawn either the command itself or the escalation shell fed with it.
    ///
    /// Children are killed if their `Child` is dropped, so a caller that is
    /// cancelled before the monitor takes over leaves no stray process.
    async fn spawn(&self, args: &[String], capture: bool) -> std::io::Result<Child> {
        let (stdout, stderr) = if capture {
            (Stdio::piped(), Stdio::piped())
        } else {
            (Stdio::inherit(), Stdio::inherit())
        };

        if self.escalation.is_enabled() {
            let mut child = Command::new(&self.escalation_shell)
                .stdin(Stdio::piped())
                .stdout(stdout)
                .stderr(stderr)
                .kill_on_drop(true)
                .spawn()?;
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(Self::escalation_script(args).as_bytes())
                    .await?;
                stdin.shutdown().await?;
            }
            Ok(child)
        } else {
            let (program, rest) = args.split_first().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line")
            })?;
            Command::new(program)
                .args(rest)
                .stdin(Stdio::null())
                .stdout(stdout)
                .stderr(stderr)
                .kill_on_drop(true)
                .spawn()
        }
    }

    /// Run to completion, capturing stdout and stderr
    async fn run_captured(&self, args: &[String]) -> Result<Output, ExecutionError> {
        let command = args.join(" ");
        let child = self
            .spawn(args, true)
            .await
            .map_err(|e| ExecutionError::SpawnFailed {
                command: command.clone(),
                reason: e.to_string(),
            })?;
        child
            .wait_with_output()
            .await
            .map_err(|e| ExecutionError::IoError(e.to_string()))
    }

    /// Deliver a signal directly, falling back to `kill` through the
    /// escalation shell when the helper runs under a privileged parent
    async fn signal(&self, pid: u32, signal_name: &str) -> Result<(), ExecutionError> {
        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let signal = match signal_name {
                "KILL" => Signal::SIGKILL,
                _ => Signal::SIGTERM,
            };
            match kill(Pid::from_raw(pid as i32), signal) {
                Ok(()) | Err(Errno::ESRCH) => Ok(()),
                Err(Errno::EPERM) if self.escalation.is_enabled() => {
                    let args = vec![
                        "kill".to_string(),
                        format!("-{}", signal_name),
                        pid.to_string(),
                    ];
                    self.check_call(&args).await
                }
                Err(e) => Err(ExecutionError::SignalFailed {
                    pid,
                    reason: e.to_string(),
                }),
            }
        }

        #[cfg(not(unix))]
        {
            let _ = signal_name;
            Err(ExecutionError::SignalFailed {
                pid,
                reason: "signals are not supported on this platform".to_string(),
            })
        }
    }
}

/// stdout followed by stderr, lossily decoded
fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

#[async_trait]
impl CommandExecutor for SubprocessExecutor {
    async fn call(&self, args: &[String]) -> Result<i32, ExecutionError> {
        let command = args.join(" ");
        let mut child = self
            .spawn(args, false)
            .await
            .map_err(|e| ExecutionError::SpawnFailed {
                command,
                reason: e.to_string(),
            })?;
        let status = child
            .wait()
            .await
            .map_err(|e| ExecutionError::IoError(e.to_string()))?;
        Ok(exit_code(&status))
    }

    async fn check_call(&self, args: &[String]) -> Result<(), ExecutionError> {
        match self.call(args).await? {
            0 => Ok(()),
            exit_code => Err(ExecutionError::NonZeroExit {
                command: args.join(" "),
                exit_code,
                output: String::new(),
            }),
        }
    }

    async fn check_output(&self, args: &[String]) -> Result<String, ExecutionError> {
        let output = self.run_captured(args).await?;
        let text = combined_output(&output);
        match exit_code(&output.status) {
            0 => Ok(text),
            exit_code => Err(ExecutionError::NonZeroExit {
                command: args.join(" "),
                exit_code,
                output: text,
            }),
        }
    }

    async fn spawn_async(
        &self,
        name: &str,
        args: &[String],
        on_exit: Option<ExitCallback>,
    ) -> Result<ProcessHandle, StartupError> {
        info!(process = %name, command = %args.join(" "), "launch helper");

        let mut child = self
            .spawn(args, true)
            .await
            .map_err(|e| StartupError::Spawn {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        tokio::time::sleep(self.grace_period).await;

        match child.try_wait() {
            Ok(None) => {
                info!(process = %name, pid = ?child.id(), "{} started", name);
                Ok(self.monitor.supervise(name, child, on_exit))
            }
            Ok(Some(_)) => {
                let (exit_code, output) = match child.wait_with_output().await {
                    Ok(output) => (exit_code(&output.status), combined_output(&output)),
                    Err(e) => {
                        error!(process = %name, error = %e, "failed to log {} exit output", name);
                        (-1, String::new())
                    }
                };
                error!(process = %name, exit_code, output = %output, "{} exit output", name);
                Err(StartupError::ExitedEarly {
                    name: name.to_string(),
                    exit_code,
                    output,
                })
            }
            Err(e) => Err(StartupError::Spawn {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn terminate(
        &self,
        handle: &ProcessHandle,
        grace: Duration,
    ) -> Result<(), ExecutionError> {
        if !handle.is_running() {
            return Ok(());
        }

        info!(process = %handle.name(), pid = handle.pid(), "Sending SIGTERM");
        self.signal(handle.pid(), "TERM").await?;

        if tokio::time::timeout(grace, handle.wait()).await.is_ok() {
            info!(process = %handle.name(), "Process exited after SIGTERM");
            return Ok(());
        }

        warn!(process = %handle.name(), pid = handle.pid(), "Process did not exit after SIGTERM, sending SIGKILL");
        self.signal(handle.pid(), "KILL").await?;
        let _ = tokio::time::timeout(grace, handle.wait()).await;
        Ok(())
    }
}
