//! The six gateway components as supervised helper processes

use netgate_core::application::ComponentSet;
use netgate_core::port::{CommandExecutor, Component};
use netgate_infra_system::{HelperComponent, LaunchCommand};
use std::sync::Arc;

/// Helpers whose failure at boot aborts the manager
const MANDATORY: [&str; 2] = ["dns", "proxy"];

/// With `reap_strays`, stopping a helper this process never started kills
/// any instance an earlier manager left running.
pub fn build(
    executor: Arc<dyn CommandExecutor>,
    launch: &LaunchCommand,
    reap_strays: bool,
) -> ComponentSet {
    let helper = |name: &str| -> Arc<dyn Component> {
        let mut spec = launch.spec(name).mandatory(MANDATORY.contains(&name));
        if reap_strays {
            spec = spec.stray_kill(launch.stray_kill_args(name));
        }
        Arc::new(HelperComponent::new(spec, executor.clone()))
    };

    ComponentSet {
        wifi: helper("wifi"),
        dns: helper("dns"),
        scrambler: helper("scrambler"),
        proxy: helper("proxy"),
        lan: helper("lan"),
        shortcut: helper("shortcut"),
    }
}
