// JSON file config source
// Re-reads the file on every call; nothing is cached

use netgate_core::domain::GatewayConfig;
use netgate_core::port::{ConfigError, ConfigSource};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct JsonFileConfigSource {
    path: PathBuf,
}

impl JsonFileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ConfigSource for JsonFileConfigSource {
    /// A missing file is an empty config (every flag enabled)
    fn read(&self) -> Result<GatewayConfig, ConfigError> {
        let path_text = self.path.display().to_string();
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path_text, "config file absent, using defaults");
                return Ok(GatewayConfig::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path_text,
                    reason: e.to_string(),
                })
            }
        };

        if text.trim().is_empty() {
            return Ok(GatewayConfig::default());
        }

        serde_json::from_str(&text).map_err(|e| ConfigError::Malformed {
            path: path_text,
            reason: e.to_string(),
        })
    }
}
