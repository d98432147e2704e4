// Shutdown Hook Registry

use super::panic_guard::execute_guarded_async;
use crate::port::{Component, ComponentError};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Append-only ordered set of components whose `stop()` runs at termination.
///
/// Keyed by component name: registering the same component again keeps
/// its original position.
#[derive(Default)]
pub struct ShutdownHooks {
    hooks: Mutex<Vec<Arc<dyn Component>>>,
}

impl ShutdownHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component's stop; returns false if already registered
    pub fn register(&self, component: Arc<dyn Component>) -> bool {
        let mut hooks = self.hooks.lock().unwrap_or_else(|p| p.into_inner());
        if hooks.iter().any(|c| c.name() == component.name()) {
            return false;
        }
        hooks.push(component);
        true
    }

    pub fn len(&self) -> usize {
        self.hooks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<String> {
        self.hooks
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Stop every registered component, newest first.
    ///
    /// Each stop is isolated; returns how many stops failed.
    pub async fn run_all(&self) -> usize {
        let snapshot: Vec<Arc<dyn Component>> = self
            .hooks
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();

        info!(hooks = snapshot.len(), "Running shutdown hooks");

        let mut failures = 0;
        for component in snapshot.iter().rev() {
            let outcome = execute_guarded_async(component.stop())
                .await
                .into_result(ComponentError::Panicked)
                .and_then(|r| r);
            if let Err(e) = outcome {
                failures += 1;
                error!(component = %component.name(), error = %e, "Shutdown hook failed");
            }
        }
        failures
    }
}
