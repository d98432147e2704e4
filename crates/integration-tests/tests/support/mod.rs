//! Gateway harness: real helper processes behind a real control plane

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use netgate_api_http::{HttpServer, HttpServerConfig, ServerHandle};
use netgate_core::application::{ComponentSet, ControlSurface, Orchestrator, ShutdownHooks};
use netgate_core::domain::{DispatchTable, EscalationSwitch};
use netgate_core::port::{argv, CommandExecutor, Component};
use netgate_infra_system::{
    HelperComponent, HelperSpec, JsonFileConfigSource, ProcessMonitor, SubprocessExecutor,
};
use netgate_sdk::NetgateClient;
use tempfile::NamedTempFile;

pub const MANDATORY: [&str; 2] = ["dns", "proxy"];

pub struct Gateway {
    pub monitor: Arc<ProcessMonitor>,
    pub executor: Arc<SubprocessExecutor>,
    pub dispatch: Arc<DispatchTable>,
    pub hooks: Arc<ShutdownHooks>,
    pub orchestrator: Arc<Orchestrator>,
    pub surface: Arc<ControlSurface>,
    pub components: ComponentSet,
    pub config_file: NamedTempFile,
    pub server: ServerHandle,
    pub client: NetgateClient,
}

/// Builder; every helper runs `sleep 30` unless scripted otherwise
#[derive(Default)]
pub struct GatewayBuilder {
    scripts: HashMap<String, String>,
    config: Option<String>,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `sh -c <script>` for the named helper
    pub fn script(mut self, name: &str, script: &str) -> Self {
        self.scripts.insert(name.to_string(), script.to_string());
        self
    }

    pub fn config(mut self, json: &str) -> Self {
        self.config = Some(json.to_string());
        self
    }

    pub async fn start(self) -> Gateway {
        let monitor = Arc::new(ProcessMonitor::new());
        let executor = Arc::new(
            SubprocessExecutor::new(EscalationSwitch::default(), monitor.clone())
                .with_grace_period(Duration::from_millis(200)),
        );

        let helper = |name: &str| -> Arc<dyn Component> {
            let args = match self.scripts.get(name) {
                Some(script) => argv(["sh", "-c", script.as_str()]),
                None => argv(["sleep", "30"]),
            };
            let spec = HelperSpec::new(name, args).mandatory(MANDATORY.contains(&name));
            let executor: Arc<dyn CommandExecutor> = executor.clone();
            Arc::new(HelperComponent::new(spec, executor).with_stop_grace(Duration::from_secs(2)))
        };
        let components = ComponentSet {
            wifi: helper("wifi"),
            dns: helper("dns"),
            scrambler: helper("scrambler"),
            proxy: helper("proxy"),
            lan: helper("lan"),
            shortcut: helper("shortcut"),
        };

        let config_file = NamedTempFile::new().unwrap();
        if let Some(json) = &self.config {
            std::fs::write(config_file.path(), json).unwrap();
        }

        let dispatch = Arc::new(DispatchTable::new());
        let hooks = Arc::new(ShutdownHooks::new());
        let orchestrator = Arc::new(Orchestrator::new(dispatch.clone(), hooks.clone()));
        let surface = Arc::new(ControlSurface::new(
            orchestrator.clone(),
            Arc::new(JsonFileConfigSource::new(config_file.path())),
            components.clone(),
        ));
        surface.register_routes(&dispatch);

        let server = HttpServer::new(
            HttpServerConfig {
                port: 0,
                ..Default::default()
            },
            dispatch.clone(),
        )
        .start()
        .await
        .unwrap();
        let client = NetgateClient::connect(format!("http://{}", server.local_addr())).unwrap();

        Gateway {
            monitor,
            executor,
            dispatch,
            hooks,
            orchestrator,
            surface,
            components,
            config_file,
            server,
            client,
        }
    }
}

impl Gateway {
    pub fn write_config(&self, json: &str) {
        std::fs::write(self.config_file.path(), json).unwrap();
    }

    /// Client whose requests give up after `timeout`
    pub fn impatient_client(&self, timeout: Duration) -> NetgateClient {
        NetgateClient::with_timeout(format!("http://{}", self.server.local_addr()), timeout)
            .unwrap()
    }

    /// Helpers still supervised by the monitor
    pub fn live_helpers(&self) -> usize {
        self.monitor.active()
    }

    /// Same path as the daemon's `run` boot step
    pub async fn boot(&self) -> Result<(), netgate_core::application::LifecycleError> {
        let config = JsonFileConfigSource::new(self.config_file.path());
        let config = netgate_core::port::ConfigSource::read(&config).unwrap_or_default();
        self.orchestrator
            .start_components(&self.components.always_on(&config))
            .await
    }

    pub async fn shutdown(mut self) {
        self.server.stop();
        self.server.stopped().await.unwrap();
        self.surface.drain(Duration::from_secs(5)).await;
        self.orchestrator.shutdown().await;
        self.monitor.shutdown(Duration::from_secs(5)).await;
    }
}

/// Poll `check` until it holds or five seconds pass
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
