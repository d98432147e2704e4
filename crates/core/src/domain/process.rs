// Supervised process handle and exit notification types

use thiserror::Error;
use tokio::sync::watch;

/// How a supervised process ended.
///
/// `code` follows the shell convention of a negative value for a process
/// killed by signal N (`-N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: i32,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Failure raised by an exit callback. Always absorbed by the monitor.
#[derive(Error, Debug)]
#[error("exit callback failed: {0}")]
pub struct CallbackError(pub String);

/// One-shot notification invoked after a supervised process exits
pub type ExitCallback = Box<dyn FnOnce(ProcessExit) -> Result<(), CallbackError> + Send + 'static>;

/// Caller-side view of a live process owned by a monitor task.
///
/// Cloning is cheap; every clone observes the same exit.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    name: String,
    pid: u32,
    exit: watch::Receiver<Option<ProcessExit>>,
}

impl ProcessHandle {
    pub fn new(name: impl Into<String>, pid: u32, exit: watch::Receiver<Option<ProcessExit>>) -> Self {
        Self {
            name: name.into(),
            pid,
            exit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn exit_status(&self) -> Option<ProcessExit> {
        *self.exit.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.exit_status().is_none()
    }

    /// Wait until the monitor reports an exit.
    ///
    /// Returns `None` only if the monitor went away without reporting.
    pub async fn wait(&self) -> Option<ProcessExit> {
        let mut rx = self.exit.clone();
        let exit = match rx.wait_for(|exit| exit.is_some()).await {
            Ok(exit) => *exit,
            Err(_) => None,
        };
        exit
    }
}
