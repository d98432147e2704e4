// Netgate Infrastructure - System Adapters
// Implements: CommandExecutor, ConfigSource, Component (helper processes)

pub mod config_file;
pub mod helper_component;
pub mod output_tail;
pub mod process_monitor;
pub mod subprocess_executor;

pub use config_file::JsonFileConfigSource;
pub use helper_component::{HelperComponent, HelperSpec, LaunchCommand};
pub use output_tail::OutputTail;
pub use process_monitor::ProcessMonitor;
pub use subprocess_executor::SubprocessExecutor;
