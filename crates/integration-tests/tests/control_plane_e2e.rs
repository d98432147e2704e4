//! Control plane end-to-end: HTTP client -> dispatch table -> orchestrator -> helper processes

mod support;

use async_trait::async_trait;
use netgate_core::application::SelfCheck;
use netgate_core::port::{PingProbe, ProbeError};
use netgate_sdk::{ComponentStatus, NetgateClient, SdkError};
use std::sync::Arc;
use std::time::Duration;
use support::GatewayBuilder;

#[tokio::test]
async fn test_ping_answers_canonical_body() {
    let gw = GatewayBuilder::new().start().await;

    assert_eq!(gw.client.ping().await.unwrap(), "PONG/2");

    gw.shutdown().await;
}

#[tokio::test]
async fn test_connect_then_disconnect_round_trip() {
    let gw = GatewayBuilder::new().start().await;

    assert!(!gw.client.is_free_internet_connected().await.unwrap());

    gw.client.connect_free_internet().await.unwrap();
    assert!(gw.client.is_free_internet_connected().await.unwrap());
    assert_eq!(
        gw.client.component_status("dns").await.unwrap(),
        ComponentStatus::Running
    );
    assert_eq!(
        gw.hooks.names(),
        vec!["dns", "scrambler", "proxy", "shortcut"]
    );

    gw.client.disconnect_free_internet().await.unwrap();
    assert!(!gw.client.is_free_internet_connected().await.unwrap());
    assert_eq!(
        gw.client.component_status("dns").await.unwrap(),
        ComponentStatus::Stopped
    );

    gw.shutdown().await;
}

#[tokio::test]
async fn test_repeated_connect_keeps_one_hook_per_component() {
    let gw = GatewayBuilder::new().start().await;

    gw.client.connect_free_internet().await.unwrap();
    gw.client.connect_free_internet().await.unwrap();

    assert_eq!(gw.hooks.len(), 4);
    assert!(gw.client.is_free_internet_connected().await.unwrap());

    gw.shutdown().await;
}

#[tokio::test]
async fn test_config_change_applies_without_restart() {
    let gw = GatewayBuilder::new()
        .config(r#"{"comp_proxy_enabled": false}"#)
        .start()
        .await;

    gw.client.connect_free_internet().await.unwrap();
    assert!(!gw.client.is_free_internet_connected().await.unwrap());
    // Never started, so no status route was contributed
    assert!(matches!(
        gw.client.component_status("proxy").await,
        Err(SdkError::Http { status: 404, .. })
    ));

    gw.write_config("{}");
    gw.client.connect_free_internet().await.unwrap();
    assert!(gw.client.is_free_internet_connected().await.unwrap());

    gw.shutdown().await;
}

#[tokio::test]
async fn test_malformed_config_falls_back_to_defaults() {
    let gw = GatewayBuilder::new()
        .config("comp_dns_enabled = false")
        .start()
        .await;

    gw.client.connect_free_internet().await.unwrap();

    assert!(gw.client.is_free_internet_connected().await.unwrap());
    gw.shutdown().await;
}

#[tokio::test]
async fn test_mandatory_failure_during_connect_keeps_serving() {
    let gw = GatewayBuilder::new()
        .script("proxy", "echo 'upstream unreachable' >&2; exit 1")
        .start()
        .await;

    gw.client.connect_free_internet().await.unwrap();

    assert!(!gw.client.is_free_internet_connected().await.unwrap());
    assert_eq!(
        gw.client.component_status("dns").await.unwrap(),
        ComponentStatus::Running
    );
    // The batch stopped at proxy
    assert!(matches!(
        gw.client.component_status("shortcut").await,
        Err(SdkError::Http { status: 404, .. })
    ));
    assert_eq!(gw.client.ping().await.unwrap(), "PONG/2");

    gw.shutdown().await;
}

struct ClientProbe(NetgateClient);

#[async_trait]
impl PingProbe for ClientProbe {
    async fn ping(&self) -> Result<String, ProbeError> {
        self.0
            .ping()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))
    }
}

#[tokio::test]
async fn test_self_check_passes_against_live_server() {
    let gw = GatewayBuilder::new().start().await;
    let check = SelfCheck::new(Arc::new(ClientProbe(gw.client.clone())))
        .with_delay(Duration::from_millis(10));

    check.run().await.unwrap();

    gw.shutdown().await;
}

#[tokio::test]
async fn test_self_check_fails_when_ping_route_is_missing() {
    let gw = GatewayBuilder::new().start().await;
    let stranger = NetgateClient::connect(format!("http://{}/elsewhere", gw.server.local_addr()))
        .unwrap();
    let check = SelfCheck::new(Arc::new(ClientProbe(stranger))).with_delay(Duration::from_millis(10));

    assert!(check.run().await.is_err());

    gw.shutdown().await;
}
