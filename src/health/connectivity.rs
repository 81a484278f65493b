//! Connectivity self-test against the backplane API.

use thiserror::Error;
use tokio::time;

use super::PROBE_TIMEOUT;
use crate::config::BackplaneConfiguration;

/// Why the backplane API could not be reached.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("invalid proxy url '{url}': {reason}")]
    InvalidProxy { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {0} timed out")]
    Timeout(String),
}

impl BackplaneConfiguration {
    /// Send one HEAD request to the API URL through the selected proxy.
    ///
    /// Any HTTP response counts as reachable. No retries.
    pub async fn check_connectivity(&self) -> Result<(), ConnectivityError> {
        let mut builder = reqwest::Client::builder().timeout(PROBE_TIMEOUT);

        builder = match self.proxy_url() {
            Some(proxy) => {
                let parsed = url::Url::parse(proxy).map_err(|e| ConnectivityError::InvalidProxy {
                    url: proxy.to_string(),
                    reason: e.to_string(),
                })?;
                let proxy = reqwest::Proxy::all(parsed.as_str()).map_err(|e| {
                    ConnectivityError::InvalidProxy {
                        url: proxy.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        let client = builder.build().map_err(ConnectivityError::Client)?;

        match time::timeout(PROBE_TIMEOUT, client.head(self.url()).send()).await {
            Ok(Ok(response)) => {
                tracing::debug!(
                    url = %self.url(),
                    status = %response.status(),
                    "Backplane API reachable"
                );
                Ok(())
            }
            Ok(Err(e)) if e.is_timeout() => Err(ConnectivityError::Timeout(self.url().to_string())),
            Ok(Err(e)) => Err(ConnectivityError::Request {
                url: self.url().to_string(),
                source: e,
            }),
            Err(_) => Err(ConnectivityError::Timeout(self.url().to_string())),
        }
    }

    /// Boolean form of [`Self::check_connectivity`], with the underlying error.
    pub async fn check_api_connection(&self) -> (bool, Option<ConnectivityError>) {
        match self.check_connectivity().await {
            Ok(()) => (true, None),
            Err(e) => (false, Some(e)),
        }
    }
}
