// Configuration Port
// Persisted gateway flags, read fresh at every decision point

use crate::domain::GatewayConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("malformed config {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// Source of the current flag map. Implementations must not cache.
pub trait ConfigSource: Send + Sync {
    fn read(&self) -> Result<GatewayConfig, ConfigError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// In-memory config that tests can swap between reads
    #[derive(Default)]
    pub struct StaticConfigSource {
        config: Mutex<GatewayConfig>,
    }

    impl StaticConfigSource {
        pub fn new(config: GatewayConfig) -> Self {
            Self {
                config: Mutex::new(config),
            }
        }

        pub fn set(&self, config: GatewayConfig) {
            *self.config.lock().unwrap() = config;
        }
    }

    impl ConfigSource for StaticConfigSource {
        fn read(&self) -> Result<GatewayConfig, ConfigError> {
            Ok(self.config.lock().unwrap().clone())
        }
    }

    /// Config source whose file is always unreadable
    pub struct BrokenConfigSource;

    impl ConfigSource for BrokenConfigSource {
        fn read(&self) -> Result<GatewayConfig, ConfigError> {
            Err(ConfigError::Malformed {
                path: "broken.json".to_string(),
                reason: "expected value at line 1 column 1".to_string(),
            })
        }
    }
}
