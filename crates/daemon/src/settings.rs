//! Command line and environment settings

use clap::{Parser, ValueEnum};
use netgate_core::application::constants::DEFAULT_HTTP_PORT;
use netgate_infra_system::LaunchCommand;
use std::path::PathBuf;

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_CONFIG_PATH: &str = "~/.netgate/config.json";
const DEFAULT_LOG_DIR: &str = "~/.netgate/log";
const DEFAULT_BUSYBOX: &str = "busybox";
const DEFAULT_PYTHON_LAUNCHER: &str = "~/.netgate/python/bin/python-launcher.sh";

/// Process entry action
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Start always-on components and serve the control plane
    Run,
    /// Stop every component and dump packet-filter tables
    Clean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "netgate-manager")]
#[command(about = "Gateway manager daemon", long_about = None)]
#[command(version)]
pub struct Settings {
    /// Entry action
    #[arg(value_enum, default_value_t = Action::Run)]
    pub action: Action,

    /// Uid to switch to when subprocesses cannot be started
    pub uid: Option<u32>,

    /// Control plane bind host
    #[arg(long, env = "NETGATE_HTTP_HOST", default_value = DEFAULT_HTTP_HOST)]
    pub http_host: String,

    /// Control plane bind port
    #[arg(long, env = "NETGATE_HTTP_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub http_port: u16,

    /// Gateway flag file (JSON object)
    #[arg(long, env = "NETGATE_CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: String,

    /// Directory for manager.log
    #[arg(long, env = "NETGATE_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: String,

    #[arg(long, env = "NETGATE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Route privileged commands through `su`
    #[arg(long, env = "NETGATE_USE_SU")]
    pub use_su: bool,

    #[arg(long, env = "NETGATE_BUSYBOX_PATH", default_value = DEFAULT_BUSYBOX)]
    pub busybox: String,

    /// Script that runs the bundled Python interpreter
    #[arg(long, env = "NETGATE_PYTHON_LAUNCHER", default_value = DEFAULT_PYTHON_LAUNCHER)]
    pub python_launcher: String,
}

impl Settings {
    pub fn config_path(&self) -> PathBuf {
        expand(&self.config_path)
    }

    pub fn log_dir(&self) -> PathBuf {
        expand(&self.log_dir)
    }

    /// How helper processes are launched
    pub fn launch_command(&self) -> LaunchCommand {
        LaunchCommand::new(
            shellexpand::tilde(&self.busybox).into_owned(),
            shellexpand::tilde(&self.python_launcher).into_owned(),
        )
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
