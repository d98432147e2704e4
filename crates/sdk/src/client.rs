//! Netgate Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{parse_flag, ComponentStatus};
use reqwest::{Client, Method, Url};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Netgate control-plane client
///
/// Proxy settings from the environment are ignored: the control plane is
/// always on localhost and the gateway may itself be the configured proxy.
///
/// # Example
///
/// ```no_run
/// use netgate_sdk::NetgateClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = NetgateClient::connect("http://127.0.0.1:8318")?;
/// assert_eq!(client.ping().await?, "PONG/2");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NetgateClient {
    client: Client,
    base: Url,
}

impl NetgateClient {
    /// Build a client for the manager at `url` (e.g., `http://127.0.0.1:8318`)
    ///
    /// No request is made until the first call.
    pub fn connect(url: impl AsRef<str>) -> Result<Self> {
        Self::with_timeout(url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(url.as_ref())
            .map_err(|e| SdkError::InvalidUrl(format!("{}: {}", url.as_ref(), e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client, base })
    }

    /// Liveness probe. A healthy manager answers `PONG/2`.
    pub async fn ping(&self) -> Result<String> {
        self.request(Method::GET, "ping").await
    }

    /// Start the free-internet bundle
    pub async fn connect_free_internet(&self) -> Result<()> {
        self.request(Method::POST, "free-internet/connect").await?;
        Ok(())
    }

    /// Stop the free-internet bundle
    pub async fn disconnect_free_internet(&self) -> Result<()> {
        self.request(Method::POST, "free-internet/disconnect").await?;
        Ok(())
    }

    /// True only when both dns and proxy are alive
    pub async fn is_free_internet_connected(&self) -> Result<bool> {
        let body = self.request(Method::GET, "free-internet/is-connected").await?;
        parse_flag(&body)
    }

    /// Status of one started helper, via its `<name>/status` route
    pub async fn component_status(&self, name: &str) -> Result<ComponentStatus> {
        let body = self
            .request(Method::GET, &format!("{}/status", name))
            .await?;
        body.parse()
    }

    async fn request(&self, method: Method, path: &str) -> Result<String> {
        let url = self
            .base
            .join(path)
            .map_err(|e| SdkError::InvalidUrl(format!("{}: {}", path, e)))?;

        let response = self.client.request(method, url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SdkError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
