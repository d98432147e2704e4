// Ping Probe Port
// Self-directed request used by the liveness self-check

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    Status(u16),
}

#[async_trait]
pub trait PingProbe: Send + Sync {
    /// Issue one ping request and return the response body
    async fn ping(&self) -> Result<String, ProbeError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock probe behavior
    #[derive(Debug, Clone)]
    pub enum ProbeBehavior {
        Respond(String),
        Refuse(String),
        Panic,
    }

    pub struct MockPingProbe {
        behavior: ProbeBehavior,
        calls: AtomicUsize,
    }

    impl MockPingProbe {
        pub fn new(behavior: ProbeBehavior) -> Self {
            Self {
                behavior,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn responding(body: impl Into<String>) -> Self {
            Self::new(ProbeBehavior::Respond(body.into()))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PingProbe for MockPingProbe {
        async fn ping(&self) -> Result<String, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                ProbeBehavior::Respond(body) => Ok(body.clone()),
                ProbeBehavior::Refuse(reason) => Err(ProbeError::Transport(reason.clone())),
                ProbeBehavior::Panic => panic!("probe exploded"),
            }
        }
    }
}
