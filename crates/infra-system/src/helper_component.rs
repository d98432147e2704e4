// Helper-process component
// A network-service component backed by one supervised privileged helper

use async_trait::async_trait;
use netgate_core::application::constants::GRACEFUL_TERMINATE_TIMEOUT;
use netgate_core::domain::{
    handler_fn, ExitCallback, HandlerResponse, ProcessExit, ProcessHandle, Route,
};
use netgate_core::port::{CommandExecutor, Component, ComponentError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Launch definition for a helper
#[derive(Debug, Clone)]
pub struct HelperSpec {
    pub name: String,
    pub args: Vec<String>,
    pub mandatory: bool,
    /// Kills a helper left by an earlier manager process, by command line
    pub stray_kill: Option<Vec<String>>,
}

impl HelperSpec {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
            mandatory: false,
            stray_kill: None,
        }
    }

    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    pub fn stray_kill(mut self, args: Vec<String>) -> Self {
        self.stray_kill = Some(args);
        self
    }
}

/// Launches a helper as `busybox sh <launcher> -m comp_<name>`
#[derive(Debug, Clone)]
pub struct LaunchCommand {
    busybox: String,
    python_launcher: String,
}

impl LaunchCommand {
    pub fn new(busybox: impl Into<String>, python_launcher: impl Into<String>) -> Self {
        Self {
            busybox: busybox.into(),
            python_launcher: python_launcher.into(),
        }
    }

    pub fn args_for(&self, name: &str) -> Vec<String> {
        vec![
            self.busybox.clone(),
            "sh".to_string(),
            self.python_launcher.clone(),
            "-m".to_string(),
            format!("comp_{}", name),
        ]
    }

    /// `busybox pkill -f comp_<name>$`: matches the module argument at the end of the command line
    pub fn stray_kill_args(&self, name: &str) -> Vec<String> {
        vec![
            self.busybox.clone(),
            "pkill".to_string(),
            "-f".to_string(),
            format!("comp_{}$", name),
        ]
    }

    pub fn spec(&self, name: &str) -> HelperSpec {
        HelperSpec::new(name, self.args_for(name))
    }
}

pub struct HelperComponent {
    spec: HelperSpec,
    executor: Arc<dyn CommandExecutor>,
    process: Mutex<Option<ProcessHandle>>,
    // Held across check-and-spawn and across terminate
    transition: tokio::sync::Mutex<()>,
    stop_grace: Duration,
}

impl HelperComponent {
    pub fn new(spec: HelperSpec, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            spec,
            executor,
            process: Mutex::new(None),
            transition: tokio::sync::Mutex::new(()),
            stop_grace: GRACEFUL_TERMINATE_TIMEOUT,
        }
    }

    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    pub fn pid(&self) -> Option<u32> {
        self.current().map(|h| h.pid())
    }

    fn current(&self) -> Option<ProcessHandle> {
        self.process
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Nothing was started by this process; fall back to the kill-by-name command if set
    async fn kill_strays(&self) -> Result<(), ComponentError> {
        let Some(args) = &self.spec.stray_kill else {
            return Ok(());
        };
        // pkill exits 1 when nothing matched
        match self.executor.call(args).await? {
            0 => info!(component = %self.spec.name, "killed helper left by an earlier run"),
            1 => debug!(component = %self.spec.name, "no stray helper"),
            code => warn!(component = %self.spec.name, exit_code = code, "stray helper kill failed"),
        }
        Ok(())
    }

    fn status_route(&self, handle: ProcessHandle) -> Route {
        Route::new(
            "GET",
            format!("{}/status", self.spec.name),
            handler_fn(move |_req| {
                let running = handle.is_running();
                async move { HandlerResponse::ok(if running { "RUNNING" } else { "STOPPED" }) }
            }),
        )
    }
}

#[async_trait]
impl Component for HelperComponent {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn is_mandatory(&self) -> bool {
        self.spec.mandatory
    }

    async fn start(&self) -> Result<Vec<Route>, ComponentError> {
        let _transition = self.transition.lock().await;
        if self.is_alive() {
            info!(component = %self.spec.name, "already running");
            return Ok(Vec::new());
        }

        let name = self.spec.name.clone();
        let on_exit: ExitCallback = Box::new(move |exit: ProcessExit| {
            if !exit.success() {
                warn!(component = %name, exit_code = exit.code, "helper exited abnormally");
            }
            Ok(())
        });

        let handle = self
            .executor
            .spawn_async(&self.spec.name, &self.spec.args, Some(on_exit))
            .await?;

        *self.process.lock().unwrap_or_else(|p| p.into_inner()) = Some(handle.clone());
        Ok(vec![self.status_route(handle)])
    }

    async fn stop(&self) -> Result<(), ComponentError> {
        let _transition = self.transition.lock().await;
        let handle = self.process.lock().unwrap_or_else(|p| p.into_inner()).take();
        match handle {
            Some(handle) if handle.is_running() => {
                self.executor.terminate(&handle, self.stop_grace).await?;
                Ok(())
            }
            Some(_) => Ok(()),
            None => self.kill_strays().await,
        }
    }

    fn is_alive(&self) -> bool {
        self.current().map(|h| h.is_running()).unwrap_or(false)
    }
}
