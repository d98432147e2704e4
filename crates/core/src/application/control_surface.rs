// Control Surface - ping and free-internet handlers

use super::catalog::ComponentSet;
use super::constants::PING_RESPONSE;
use super::orchestrator::Orchestrator;
use crate::domain::{handler_fn, DispatchTable, GatewayConfig, HandlerResponse};
use crate::port::ConfigSource;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub const PING_PATH: &str = "ping";
pub const CONNECT_PATH: &str = "free-internet/connect";
pub const DISCONNECT_PATH: &str = "free-internet/disconnect";
pub const IS_CONNECTED_PATH: &str = "free-internet/is-connected";

/// Caller-facing operations on the free-internet bundle
///
/// Connect and disconnect requested over HTTP run as owned tasks: a caller
/// that hangs up does not cancel a batch halfway.
pub struct ControlSurface {
    orchestrator: Arc<Orchestrator>,
    config: Arc<dyn ConfigSource>,
    components: ComponentSet,
    tasks: Mutex<JoinSet<()>>,
}

impl ControlSurface {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        config: Arc<dyn ConfigSource>,
        components: ComponentSet,
    ) -> Self {
        Self {
            orchestrator,
            config,
            components,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Fresh config read; an unreadable file behaves like an empty one
    fn current_config(&self) -> GatewayConfig {
        match self.config.read() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to read config, using defaults");
                GatewayConfig::default()
            }
        }
    }

    /// Start the enabled part of the bundle.
    ///
    /// A mandatory failure here is logged only; the process keeps serving.
    pub async fn connect(&self) {
        let subset = self.components.connect_subset(&self.current_config());
        info!(components = subset.len(), "Connecting free internet");

        if let Err(e) = self.orchestrator.start_components(&subset).await {
            error!(error = %e, "Free internet connect incomplete");
        }
    }

    /// Stop the whole bundle regardless of config
    pub async fn disconnect(&self) {
        info!("Disconnecting free internet");
        self.orchestrator
            .stop_components(&self.components.free_internet_bundle())
            .await;
    }

    /// Connected iff both dns and proxy report alive
    pub fn is_connected(&self) -> bool {
        self.components.dns.is_alive() && self.components.proxy.is_alive()
    }

    /// Run `work` to completion on a task owned by this surface.
    ///
    /// The receiver resolves when the work is done; dropping it does not
    /// cancel the work.
    fn spawn_owned<F>(&self, work: F) -> oneshot::Receiver<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            work.await;
            let _ = done_tx.send(());
        });
        done_rx
    }

    /// Wait for in-flight connect/disconnect work, aborting it after `timeout`
    pub async fn drain(&self, timeout: Duration) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(|p| p.into_inner()));

        let joined = tokio::time::timeout(timeout, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if joined.is_err() {
            warn!(pending = tasks.len(), "Aborting control-plane work still running");
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }
    }

    /// Install the control-plane routes into the dispatch table
    pub fn register_routes(self: &Arc<Self>, table: &DispatchTable) {
        table.insert(
            "GET",
            PING_PATH,
            handler_fn(|_req| async { HandlerResponse::ok(PING_RESPONSE) }),
        );

        let surface = Arc::clone(self);
        table.insert(
            "POST",
            CONNECT_PATH,
            handler_fn(move |_req| {
                let worker = Arc::clone(&surface);
                let done = surface.spawn_owned(async move { worker.connect().await });
                async move {
                    match done.await {
                        Ok(()) => HandlerResponse::empty(),
                        Err(_) => HandlerResponse::internal_error("connect did not complete"),
                    }
                }
            }),
        );

        let surface = Arc::clone(self);
        table.insert(
            "POST",
            DISCONNECT_PATH,
            handler_fn(move |_req| {
                let worker = Arc::clone(&surface);
                let done = surface.spawn_owned(async move { worker.disconnect().await });
                async move {
                    match done.await {
                        Ok(()) => HandlerResponse::empty(),
                        Err(_) => HandlerResponse::internal_error("disconnect did not complete"),
                    }
                }
            }),
        );

        let surface = Arc::clone(self);
        table.insert(
            "GET",
            IS_CONNECTED_PATH,
            handler_fn(move |_req| {
                let connected = surface.is_connected();
                async move { HandlerResponse::ok(if connected { "TRUE" } else { "FALSE" }) }
            }),
        );
    }
}
