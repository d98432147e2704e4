// Component Lifecycle Orchestrator

use super::panic_guard::execute_guarded_async;
use super::shutdown_hooks::ShutdownHooks;
use crate::domain::DispatchTable;
use crate::port::{Component, ComponentError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

/// A mandatory component failed and aborted its start batch
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("mandatory component {component} failed to start: {source}")]
    MandatoryComponentFailed {
        component: String,
        #[source]
        source: ComponentError,
    },
}

/// Sequences component start/stop against the shared registries.
///
/// Batches run strictly in caller order; routes are merged as each
/// component comes up. One batch runs at a time: a stop issued while a
/// start batch is in flight waits for that batch to finish.
pub struct Orchestrator {
    dispatch: Arc<DispatchTable>,
    hooks: Arc<ShutdownHooks>,
    batch: Mutex<()>,
}

impl Orchestrator {
    pub fn new(dispatch: Arc<DispatchTable>, hooks: Arc<ShutdownHooks>) -> Self {
        Self {
            dispatch,
            hooks,
            batch: Mutex::new(()),
        }
    }

    pub fn dispatch(&self) -> &Arc<DispatchTable> {
        &self.dispatch
    }

    pub fn hooks(&self) -> &Arc<ShutdownHooks> {
        &self.hooks
    }

    /// Start components in order with best-effort-with-mandatory-gate semantics.
    ///
    /// An optional component's failure is compensated and skipped. A
    /// mandatory component's failure is compensated and returned; later
    /// components are not attempted and earlier ones stay up.
    pub async fn start_components(
        &self,
        components: &[Arc<dyn Component>],
    ) -> Result<(), LifecycleError> {
        let _batch = self.batch.lock().await;
        for component in components {
            let name = component.name().to_string();

            // Stop must be reachable even if start dies halfway
            self.hooks.register(Arc::clone(component));

            let outcome = execute_guarded_async(component.start())
                .await
                .into_result(ComponentError::Panicked)
                .and_then(|r| r);

            match outcome {
                Ok(routes) => {
                    let route_count = routes.len();
                    self.dispatch.merge(routes);
                    info!(component = %name, routes = route_count, "Started component");
                }
                Err(e) => {
                    error!(component = %name, error = %e, "Failed to start component");
                    self.stop_one(component.as_ref()).await;

                    if component.is_mandatory() {
                        return Err(LifecycleError::MandatoryComponentFailed {
                            component: name,
                            source: e,
                        });
                    }
                    info!(component = %name, "Skipped component");
                }
            }
        }
        Ok(())
    }

    /// Stop components in reverse order; one failure never blocks the rest
    pub async fn stop_components(&self, components: &[Arc<dyn Component>]) {
        let _batch = self.batch.lock().await;
        for component in components.iter().rev() {
            self.stop_one(component.as_ref()).await;
        }
    }

    /// Run the shutdown hooks once any in-flight batch has finished.
    ///
    /// Returns how many stops failed.
    pub async fn shutdown(&self) -> usize {
        let _batch = self.batch.lock().await;
        self.hooks.run_all().await
    }

    async fn stop_one(&self, component: &dyn Component) {
        let outcome = execute_guarded_async(component.stop())
            .await
            .into_result(ComponentError::Panicked)
            .and_then(|r| r);

        match outcome {
            Ok(()) => info!(component = %component.name(), "Stopped component"),
            Err(e) => error!(component = %component.name(), error = %e, "Failed to stop component"),
        }
    }
}
