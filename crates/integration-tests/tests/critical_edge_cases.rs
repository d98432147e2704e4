//! Lifecycle edge cases against real helper processes

mod support;

use netgate_core::application::LifecycleError;
use netgate_core::port::ComponentError;
use netgate_sdk::{ComponentStatus, SdkError};
use std::sync::Arc;
use std::time::Duration;
use support::{eventually, GatewayBuilder};

#[tokio::test]
async fn test_boot_skips_optional_failure() {
    let gw = GatewayBuilder::new()
        .script("wifi", "echo 'no wlan0' >&2; exit 3")
        .start()
        .await;

    gw.boot().await.unwrap();

    assert_eq!(gw.hooks.names(), vec!["wifi", "lan"]);
    assert_eq!(
        gw.client.component_status("lan").await.unwrap(),
        ComponentStatus::Running
    );
    assert!(matches!(
        gw.client.component_status("wifi").await,
        Err(SdkError::Http { status: 404, .. })
    ));

    gw.shutdown().await;
}

#[tokio::test]
async fn test_boot_without_wifi_starts_lan_only() {
    let gw = GatewayBuilder::new()
        .config(r#"{"comp_wifi_enabled": 0}"#)
        .start()
        .await;

    gw.boot().await.unwrap();

    assert_eq!(gw.hooks.names(), vec!["lan"]);
    gw.shutdown().await;
}

#[tokio::test]
async fn test_mandatory_failure_aborts_batch() {
    let gw = GatewayBuilder::new().script("dns", "exit 9").start().await;
    let batch = vec![gw.components.dns.clone(), gw.components.lan.clone()];

    let err = gw.orchestrator.start_components(&batch).await.unwrap_err();

    let LifecycleError::MandatoryComponentFailed { component, source } = err;
    assert_eq!(component, "dns");
    assert!(matches!(source, ComponentError::Startup(_)));
    assert_eq!(gw.hooks.names(), vec!["dns"]);
    assert!(!gw.components.lan.is_alive());

    gw.shutdown().await;
}

#[tokio::test]
async fn test_helper_crash_flips_is_connected() {
    let gw = GatewayBuilder::new()
        .script("dns", "sleep 1; exit 7")
        .start()
        .await;

    gw.client.connect_free_internet().await.unwrap();

    let client = gw.client.clone();
    let dropped = eventually(|| {
        let client = client.clone();
        async move { matches!(client.is_free_internet_connected().await, Ok(false)) }
    })
    .await;
    assert!(dropped);
    assert_eq!(
        gw.client.component_status("dns").await.unwrap(),
        ComponentStatus::Stopped
    );

    gw.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_hooks_stop_every_started_helper() {
    let gw = GatewayBuilder::new().start().await;
    gw.boot().await.unwrap();
    gw.client.connect_free_internet().await.unwrap();
    let started: Vec<_> = gw.components.all();
    assert!(started.iter().all(|c| c.is_alive()));

    let failures = gw.hooks.run_all().await;

    assert_eq!(failures, 0);
    assert!(started.iter().all(|c| !c.is_alive()));
    gw.monitor.shutdown(Duration::from_secs(5)).await;
    assert_eq!(gw.monitor.active(), 0);
}

#[tokio::test]
async fn test_stubborn_helper_is_killed_on_stop() {
    let gw = GatewayBuilder::new()
        .script("scrambler", "trap '' TERM; while :; do :; done")
        .start()
        .await;
    let scrambler = Arc::clone(&gw.components.scrambler);

    gw.orchestrator
        .start_components(&[scrambler.clone()])
        .await
        .unwrap();
    gw.orchestrator.stop_components(&[scrambler.clone()]).await;

    assert!(!scrambler.is_alive());
    gw.shutdown().await;
}

#[tokio::test]
async fn test_connect_completes_after_client_gives_up() {
    let gw = GatewayBuilder::new().start().await;
    let impatient = gw.impatient_client(Duration::from_millis(80));

    assert!(impatient.connect_free_internet().await.is_err());

    let hooks = Arc::clone(&gw.hooks);
    let finished = eventually(|| {
        let hooks = Arc::clone(&hooks);
        async move { hooks.len() == 4 }
    })
    .await;
    assert!(finished);
    assert!(gw.client.is_free_internet_connected().await.unwrap());
    assert_eq!(gw.live_helpers(), 4);
    assert!(gw.components.dns.is_alive());

    gw.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_connects_spawn_each_helper_once() {
    let gw = GatewayBuilder::new().start().await;

    let (first, second) = tokio::join!(
        gw.client.connect_free_internet(),
        gw.client.connect_free_internet()
    );
    first.unwrap();
    second.unwrap();

    assert_eq!(gw.live_helpers(), 4);
    assert_eq!(gw.hooks.len(), 4);
    assert!(gw.client.is_free_internet_connected().await.unwrap());

    gw.shutdown().await;
}

#[tokio::test]
async fn test_disconnect_racing_connect_leaves_bundle_stopped() {
    let gw = GatewayBuilder::new().start().await;

    let (connected, disconnected) = tokio::join!(gw.client.connect_free_internet(), async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        gw.client.disconnect_free_internet().await
    });
    connected.unwrap();
    disconnected.unwrap();

    assert!(!gw.client.is_free_internet_connected().await.unwrap());
    assert!(gw
        .components
        .free_internet_bundle()
        .iter()
        .all(|c| !c.is_alive()));
    let monitor = Arc::clone(&gw.monitor);
    assert!(eventually(|| {
        let monitor = Arc::clone(&monitor);
        async move { monitor.active() == 0 }
    })
    .await);

    gw.shutdown().await;
}
