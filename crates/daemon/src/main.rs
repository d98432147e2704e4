//! Netgate Manager - Main Entry Point
//!
//! `run` starts the always-on components and serves the control plane;
//! `clean` stops every component and dumps the packet-filter tables.

mod components;
mod logging;
mod privilege;
mod probe;
mod settings;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use netgate_api_http::{HttpServer, HttpServerConfig};
use netgate_core::application::constants::MONITOR_JOIN_TIMEOUT;
use netgate_core::application::{
    CleanService, ComponentSet, ControlSurface, Orchestrator, SelfCheck, ShutdownHooks,
    TableDump,
};
use netgate_core::domain::{DispatchTable, EscalationSwitch, GatewayConfig};
use netgate_core::port::ConfigSource;
use netgate_infra_system::{JsonFileConfigSource, ProcessMonitor, SubprocessExecutor};

use crate::probe::HttpPingProbe;
use crate::settings::{Action, Settings};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared state wired once at startup
struct Runtime {
    monitor: Arc<ProcessMonitor>,
    executor: Arc<SubprocessExecutor>,
    dispatch: Arc<DispatchTable>,
    orchestrator: Arc<Orchestrator>,
    config: Arc<dyn ConfigSource>,
    components: ComponentSet,
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();

    // 1. Initialize logging
    let _log_guard = logging::init(settings.log_format, &settings.log_dir())?;
    info!("Netgate manager v{} starting...", VERSION);

    // 2. Wire dependencies
    let escalation = EscalationSwitch::default();
    let monitor = Arc::new(ProcessMonitor::new());
    let executor = Arc::new(SubprocessExecutor::new(escalation.clone(), monitor.clone()));

    // 3. Make sure child processes can be started (setuid fallback)
    privilege::ensure_subprocess(executor.as_ref(), settings.uid).await;
    if settings.use_su {
        info!("Privileged commands go through su");
        escalation.set(true);
    }

    let dispatch = Arc::new(DispatchTable::new());
    let runtime = Runtime {
        orchestrator: Arc::new(Orchestrator::new(
            dispatch.clone(),
            Arc::new(ShutdownHooks::new()),
        )),
        config: Arc::new(JsonFileConfigSource::new(settings.config_path())),
        components: components::build(
            executor.clone(),
            &settings.launch_command(),
            settings.action == Action::Clean,
        ),
        monitor,
        executor,
        dispatch,
    };

    match settings.action {
        Action::Run => run(&runtime, &settings).await,
        Action::Clean => {
            clean(&runtime).await;
            Ok(())
        }
    }
}

async fn run(rt: &Runtime, settings: &Settings) -> Result<()> {
    let config = rt.config.read().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read config, using defaults");
        GatewayConfig::default()
    });

    // 4. Always-on components; a mandatory failure here is fatal
    if let Err(e) = rt
        .orchestrator
        .start_components(&rt.components.always_on(&config))
        .await
    {
        error!(error = %e, "Startup aborted");
        teardown(rt).await;
        return Err(e).context("mandatory component failed during startup");
    }

    // 5. Control plane
    let surface = Arc::new(ControlSurface::new(
        rt.orchestrator.clone(),
        rt.config.clone(),
        rt.components.clone(),
    ));
    surface.register_routes(&rt.dispatch);

    let server_config = HttpServerConfig {
        host: settings.http_host.clone(),
        port: settings.http_port,
    };
    let mut server = match HttpServer::new(server_config, rt.dispatch.clone()).start().await {
        Ok(server) => server,
        Err(e) => {
            teardown(rt).await;
            return Err(e).context("HTTP server start failed");
        }
    };

    // 6. Liveness self-check against the bound address
    let self_check = SelfCheck::new(Arc::new(
        HttpPingProbe::for_bound(server.local_addr()).context("Failed to build ping probe")?,
    ));
    let check_task = tokio::spawn(async move { self_check.run().await });
    let liveness = async move {
        match check_task.await {
            Ok(Ok(())) => std::future::pending::<anyhow::Error>().await,
            Ok(Err(e)) => anyhow::Error::from(e),
            Err(e) => anyhow!("self-check task failed: {}", e),
        }
    };
    tokio::pin!(liveness);

    info!("System ready. Press Ctrl+C to shutdown");

    // 7. Serve until a signal, a failed self-check, or a dead server
    let outcome = tokio::select! {
        signal = shutdown_signal() => match signal {
            Ok(()) => {
                info!("Shutdown signal received. Exiting gracefully...");
                Ok(())
            }
            Err(e) => Err(anyhow::Error::from(e).context("Failed to listen for shutdown signal")),
        },
        fatal = &mut liveness => Err(fatal.context("liveness self-check failed")),
        served = server.stopped() => match served {
            Ok(()) => Err(anyhow!("HTTP server exited unexpectedly")),
            Err(e) => Err(anyhow::Error::from(e).context("HTTP server failed")),
        },
    };

    // 8. Graceful shutdown
    server.stop();
    if let Err(e) = server.stopped().await {
        warn!(error = %e, "HTTP server did not stop cleanly");
    }
    surface.drain(MONITOR_JOIN_TIMEOUT).await;
    teardown(rt).await;

    info!("Shutdown complete.");
    outcome
}

/// Run shutdown hooks once no batch is in flight, then join process monitors
async fn teardown(rt: &Runtime) {
    let failures = rt.orchestrator.shutdown().await;
    if failures > 0 {
        warn!(failures, "Some components failed to stop");
    }
    rt.monitor.shutdown(MONITOR_JOIN_TIMEOUT).await;
}

async fn clean(rt: &Runtime) {
    let report = CleanService::new(&rt.orchestrator, rt.executor.as_ref())
        .clean(&rt.components)
        .await;

    let failed = [&report.filter, &report.nat]
        .iter()
        .filter(|dump| matches!(dump, TableDump::Failed { .. }))
        .count();
    info!(failed_dumps = failed, "clean finished");
    rt.monitor.shutdown(MONITOR_JOIN_TIMEOUT).await;
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
