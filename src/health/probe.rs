//! Health probe through a candidate proxy.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time;
use url::Url;

use super::PROBE_TIMEOUT;

/// Why a single probe produced no status code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("could not build client for proxy: {0}")]
    Client(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Capability to issue one health probe through a proxy.
///
/// Returns the HTTP status code of the response to a GET on `target`.
pub trait ProxyProbe: Sync {
    fn probe(
        &self,
        proxy: &Url,
        target: &str,
    ) -> impl Future<Output = Result<u16, ProbeError>> + Send;
}

impl<P: ProxyProbe + ?Sized> ProxyProbe for &P {
    fn probe(
        &self,
        proxy: &Url,
        target: &str,
    ) -> impl Future<Output = Result<u16, ProbeError>> + Send {
        (**self).probe(proxy, target)
    }
}

/// Probe backed by a fresh `reqwest` client per call.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    timeout: Duration,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self {
            timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyProbe for HttpProbe {
    async fn probe(&self, proxy: &Url, target: &str) -> Result<u16, ProbeError> {
        let proxy = reqwest::Proxy::all(proxy.as_str())
            .map_err(|e| ProbeError::Client(e.to_string()))?;
        let client = reqwest::Client::builder()
            .proxy(proxy)
            .user_agent(concat!("ocm-backplane/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        let request = client.get(target).send();

        match time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => Ok(response.status().as_u16()),
            Ok(Err(e)) if e.is_timeout() => Err(ProbeError::Timeout(self.timeout)),
            Ok(Err(e)) => Err(ProbeError::Transport(e.to_string())),
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }
}
