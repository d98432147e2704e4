// Liveness Self-Check
// Confirms the control plane answers before anything depends on it

use super::constants::{PING_RESPONSE, SELF_CHECK_DELAY};
use super::panic_guard::execute_guarded_async;
use crate::port::{PingProbe, ProbeError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Self-check failure. Fatal to the process.
#[derive(Error, Debug)]
pub enum LivenessError {
    #[error("ping does not respond correctly: {0:?}")]
    UnexpectedResponse(String),

    #[error("ping request failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("ping probe panicked: {0}")]
    Panicked(String),
}

pub struct SelfCheck {
    probe: Arc<dyn PingProbe>,
    delay: Duration,
}

impl SelfCheck {
    pub fn new(probe: Arc<dyn PingProbe>) -> Self {
        Self {
            probe,
            delay: SELF_CHECK_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Wait out the delay, then issue exactly one ping.
    ///
    /// Only the exact canonical body passes. The caller owns the decision to
    /// terminate the process on error.
    pub async fn run(&self) -> Result<(), LivenessError> {
        tokio::time::sleep(self.delay).await;

        let outcome = execute_guarded_async(self.probe.ping())
            .await
            .into_result(LivenessError::Panicked)
            .and_then(|r| r.map_err(LivenessError::from))
            .and_then(|body| {
                if body == PING_RESPONSE {
                    Ok(())
                } else {
                    Err(LivenessError::UnexpectedResponse(body))
                }
            });

        match &outcome {
            Ok(()) => info!("check ping succeed"),
            Err(e) => error!(error = %e, "check ping failed"),
        }
        outcome
    }
}
