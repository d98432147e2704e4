//! Self-directed ping over HTTP

use async_trait::async_trait;
use netgate_core::port::{PingProbe, ProbeError};
use netgate_sdk::{NetgateClient, SdkError};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpPingProbe {
    client: NetgateClient,
}

impl HttpPingProbe {
    /// Probe the server bound at `addr`; a wildcard bind is probed via loopback
    pub fn for_bound(mut addr: SocketAddr) -> Result<Self, SdkError> {
        if addr.ip().is_unspecified() {
            addr.set_ip(Ipv4Addr::LOCALHOST.into());
        }
        let client = NetgateClient::with_timeout(format!("http://{}", addr), PROBE_TIMEOUT)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PingProbe for HttpPingProbe {
    async fn ping(&self) -> Result<String, ProbeError> {
        self.client.ping().await.map_err(|e| match e {
            SdkError::Http { status, .. } => ProbeError::Status(status),
            other => ProbeError::Transport(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HttpPingProbe::for_bound(addr).unwrap();

        assert!(matches!(probe.ping().await, Err(ProbeError::Transport(_))));
    }

    #[test]
    fn test_wildcard_bind_is_probed_on_loopback() {
        let probe = HttpPingProbe::for_bound("0.0.0.0:8318".parse().unwrap());

        assert!(probe.is_ok());
    }
}
