// Command Executor Port
// Abstraction for running external commands, directly or through escalation

use crate::domain::{ExitCallback, ProcessHandle};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Synchronous execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed for `{command}`: {reason}")]
    SpawnFailed { command: String, reason: String },

    #[error("Command `{command}` exited with status {exit_code}")]
    NonZeroExit {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("Signal delivery to pid {pid} failed: {reason}")]
    SignalFailed { pid: u32, reason: String },

    #[error("IO error: {0}")]
    IoError(String),
}

impl ExecutionError {
    /// Exit code carried by a non-zero exit
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecutionError::NonZeroExit { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Captured text carried by a non-zero exit
    pub fn output(&self) -> Option<&str> {
        match self {
            ExecutionError::NonZeroExit { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// A supervised launch that did not survive the grace period
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to spawn {name}: {reason}")]
    Spawn { name: String, reason: String },

    #[error("{name} exited immediately with status {exit_code}")]
    ExitedEarly {
        name: String,
        exit_code: i32,
        output: String,
    },
}

/// Command Executor trait
///
/// Every call consults the process-wide escalation switch. While escalation
/// is active the argument vector is joined with single spaces and fed to a
/// privileged shell, so arguments must not contain whitespace or shell
/// metacharacters.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run to completion and return the exit code
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the process cannot be started
    async fn call(&self, args: &[String]) -> Result<i32, ExecutionError>;

    /// Run to completion; non-zero exit is an error
    ///
    /// # Errors
    /// - ExecutionError::NonZeroExit carrying the exit code
    async fn check_call(&self, args: &[String]) -> Result<(), ExecutionError>;

    /// Run to completion and return combined stdout/stderr
    ///
    /// # Errors
    /// - ExecutionError::NonZeroExit carrying exit code and captured output
    async fn check_output(&self, args: &[String]) -> Result<String, ExecutionError>;

    /// Launch a long-running helper and hand it to the process monitor
    ///
    /// Waits out the grace period first; a process that is already gone by
    /// then is reported as StartupError::ExitedEarly and never supervised.
    async fn spawn_async(
        &self,
        name: &str,
        args: &[String],
        on_exit: Option<ExitCallback>,
    ) -> Result<ProcessHandle, StartupError>;

    /// Stop a supervised process: SIGTERM, then SIGKILL after `grace`
    async fn terminate(&self, handle: &ProcessHandle, grace: Duration)
        -> Result<(), ExecutionError>;
}

/// Build an owned argument vector from string literals
pub fn argv<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter().map(Into::into).collect()
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::ProcessExit;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::watch;

    /// Scripted reply for a command line
    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// Exit 0 with output
        Output(String),
        /// Exit with a non-zero status and output
        Exit(i32, String),
    }

    /// Mock executor with replies keyed by the space-joined command line.
    /// Unscripted commands succeed with empty output.
    #[derive(Default)]
    pub struct MockCommandExecutor {
        replies: Mutex<HashMap<String, MockReply>>,
        calls: Mutex<Vec<String>>,
        next_pid: Mutex<u32>,
        // Keep exit senders alive so spawned handles report running
        exits: Mutex<Vec<watch::Sender<Option<ProcessExit>>>>,
    }

    impl MockCommandExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, command_line: &str, reply: MockReply) -> Self {
            self.replies
                .lock()
                .unwrap()
                .insert(command_line.to_string(), reply);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn run(&self, args: &[String]) -> (i32, String) {
            let line = args.join(" ");
            self.calls.lock().unwrap().push(line.clone());
            match self.replies.lock().unwrap().get(&line).cloned() {
                Some(MockReply::Output(out)) => (0, out),
                Some(MockReply::Exit(code, out)) => (code, out),
                None => (0, String::new()),
            }
        }
    }

    #[async_trait]
    impl CommandExecutor for MockCommandExecutor {
        async fn call(&self, args: &[String]) -> Result<i32, ExecutionError> {
            Ok(self.run(args).0)
        }

        async fn check_call(&self, args: &[String]) -> Result<(), ExecutionError> {
            self.check_output(args).await.map(|_| ())
        }

        async fn check_output(&self, args: &[String]) -> Result<String, ExecutionError> {
            match self.run(args) {
                (0, output) => Ok(output),
                (exit_code, output) => Err(ExecutionError::NonZeroExit {
                    command: args.join(" "),
                    exit_code,
                    output,
                }),
            }
        }

        async fn spawn_async(
            &self,
            name: &str,
            args: &[String],
            _on_exit: Option<ExitCallback>,
        ) -> Result<ProcessHandle, StartupError> {
            match self.run(args) {
                (0, _) => {
                    let (tx, rx) = watch::channel(None);
                    self.exits.lock().unwrap().push(tx);
                    let mut pid = self.next_pid.lock().unwrap();
                    *pid += 1;
                    Ok(ProcessHandle::new(name, 1000 + *pid, rx))
                }
                (exit_code, output) => Err(StartupError::ExitedEarly {
                    name: name.to_string(),
                    exit_code,
                    output,
                }),
            }
        }

        async fn terminate(
            &self,
            handle: &ProcessHandle,
            _grace: Duration,
        ) -> Result<(), ExecutionError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("terminate {}", handle.pid()));
            Ok(())
        }
    }
}
