//! HTTP Server
//!
//! Binds the control plane on localhost and serves the dispatch table.

use crate::error::ServerError;
use crate::handler::dispatch;
use axum::Router;
use netgate_core::application::constants::DEFAULT_HTTP_PORT;
use netgate_core::domain::DispatchTable;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Router with a single fallback that consults the dispatch table
pub fn router(table: Arc<DispatchTable>) -> Router {
    Router::new().fallback(dispatch).with_state(table)
}

/// HTTP Server
pub struct HttpServer {
    config: HttpServerConfig,
    table: Arc<DispatchTable>,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, table: Arc<DispatchTable>) -> Self {
        Self { config, table }
    }

    /// Bind and start serving in a background task.
    ///
    /// Returns once the listener is bound, so requests issued after this
    /// call reach the server.
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        // Host names such as "localhost" resolve here
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|source| ServerError::Bind {
                addr: format!("{}:{}", self.config.host, self.config.port),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        info!(addr = %local_addr, "Starting HTTP control plane (localhost only)");

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let app = router(self.table);
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.wait_for(|&stop| stop).await;
                })
                .await
        });

        Ok(ServerHandle {
            local_addr,
            shutdown_tx,
            task: Some(task),
        })
    }
}

/// Owned handle to the running server task
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Request graceful shutdown
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for the server task to end. Cancel-safe.
    pub async fn stopped(&mut self) -> Result<(), ServerError> {
        let Some(task) = self.task.as_mut() else {
            return Ok(());
        };
        let joined = task.await;
        self.task = None;

        match joined {
            Ok(result) => result.map_err(ServerError::Serve),
            Err(e) => Err(ServerError::Task(e.to_string())),
        }
    }
}
