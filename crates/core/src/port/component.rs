// Component Port
// Contract every network-service unit exposes to the orchestrator

use crate::domain::Route;
use crate::port::{ExecutionError, StartupError};
use async_trait::async_trait;
use thiserror::Error;

/// Failure raised from a component's start or stop
#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("panicked: {0}")]
    Panicked(String),
}

/// Pluggable network-service unit.
///
/// The orchestrator only drives this contract; it never reaches into a
/// component's internal state.
///
/// `stop()` is registered as a shutdown hook before `start()` runs, so it
/// must be safe on a component that never started.
#[async_trait]
pub trait Component: Send + Sync {
    /// Stable name used in logs and hook bookkeeping
    fn name(&self) -> &str;

    /// A mandatory component's start failure aborts the whole batch
    fn is_mandatory(&self) -> bool {
        false
    }

    /// Start the component; returned routes are merged into the dispatch table
    async fn start(&self) -> Result<Vec<Route>, ComponentError>;

    /// Stop the component (idempotent)
    async fn stop(&self) -> Result<(), ComponentError>;

    /// Liveness predicate
    fn is_alive(&self) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{handler_fn, HandlerResponse};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Shared, ordered record of lifecycle calls across several mocks
    pub type Journal = Arc<Mutex<Vec<String>>>;

    pub fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    /// Mock start behavior
    #[derive(Debug, Clone)]
    pub enum StartBehavior {
        /// Start succeeds and contributes `GET <name>/status`
        Succeed,
        /// Start returns an error
        Fail(String),
        /// Start panics
        Panic(String),
    }

    /// Mock component recording every lifecycle call into a journal
    pub struct MockComponent {
        name: String,
        mandatory: bool,
        start_behavior: StartBehavior,
        fail_stop: bool,
        start_delay: Duration,
        alive: AtomicBool,
        start_calls: AtomicUsize,
        stop_calls: AtomicUsize,
        journal: Journal,
    }

    impl MockComponent {
        pub fn new(name: impl Into<String>, journal: Journal) -> Self {
            Self {
                name: name.into(),
                mandatory: false,
                start_behavior: StartBehavior::Succeed,
                fail_stop: false,
                start_delay: Duration::ZERO,
                alive: AtomicBool::new(false),
                start_calls: AtomicUsize::new(0),
                stop_calls: AtomicUsize::new(0),
                journal,
            }
        }

        pub fn mandatory(mut self) -> Self {
            self.mandatory = true;
            self
        }

        pub fn failing_start(mut self, message: impl Into<String>) -> Self {
            self.start_behavior = StartBehavior::Fail(message.into());
            self
        }

        pub fn panicking_start(mut self, message: impl Into<String>) -> Self {
            self.start_behavior = StartBehavior::Panic(message.into());
            self
        }

        /// Start suspends for `delay` after recording the call
        pub fn slow_start(mut self, delay: Duration) -> Self {
            self.start_delay = delay;
            self
        }

        pub fn failing_stop(mut self) -> Self {
            self.fail_stop = true;
            self
        }

        pub fn set_alive(&self, alive: bool) {
            self.alive.store(alive, Ordering::SeqCst);
        }

        pub fn start_calls(&self) -> usize {
            self.start_calls.load(Ordering::SeqCst)
        }

        pub fn stop_calls(&self) -> usize {
            self.stop_calls.load(Ordering::SeqCst)
        }

        fn record(&self, event: &str) {
            self.journal
                .lock()
                .unwrap()
                .push(format!("{}:{}", event, self.name));
        }
    }

    #[async_trait]
    impl Component for MockComponent {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_mandatory(&self) -> bool {
            self.mandatory
        }

        async fn start(&self) -> Result<Vec<Route>, ComponentError> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            self.record("start");
            if !self.start_delay.is_zero() {
                tokio::time::sleep(self.start_delay).await;
            }

            match &self.start_behavior {
                StartBehavior::Succeed => {
                    self.set_alive(true);
                    Ok(vec![Route::new(
                        "GET",
                        format!("{}/status", self.name),
                        handler_fn(|_req| async { HandlerResponse::ok("RUNNING") }),
                    )])
                }
                StartBehavior::Fail(msg) => Err(ComponentError::Failed(msg.clone())),
                StartBehavior::Panic(msg) => panic!("{}", msg),
            }
        }

        async fn stop(&self) -> Result<(), ComponentError> {
            self.stop_calls.fetch_add(1, Ordering::SeqCst);
            self.record("stop");
            self.set_alive(false);

            if self.fail_stop {
                return Err(ComponentError::Failed(format!("{} refused to stop", self.name)));
            }
            Ok(())
        }

        fn is_alive(&self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }
    }
}
