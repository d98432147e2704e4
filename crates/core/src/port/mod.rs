// Port Layer - Interfaces for external collaborators

pub mod command_executor;
pub mod component;
pub mod config_source;
pub mod ping_probe;

// Re-exports
pub use command_executor::{argv, CommandExecutor, ExecutionError, StartupError};
pub use component::{Component, ComponentError};
pub use config_source::{ConfigError, ConfigSource};
pub use ping_probe::{PingProbe, ProbeError};
