//! First-healthy proxy selection.

use futures_util::stream::{FuturesOrdered, StreamExt};
use thiserror::Error;
use url::Url;

use crate::health::{ProbeError, ProxyProbe};
use crate::info::HEALTH_CHECK_PATH;

/// How candidates are probed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProbeStrategy {
    /// One at a time in list order, stopping at the first pass.
    #[default]
    Sequential,
    /// All at once; the earliest passing candidate in list order still wins.
    Concurrent,
}

/// Why a candidate string is not usable as a proxy URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CandidateError {
    #[error("contains control characters")]
    ControlCharacters,

    #[error("{0}")]
    Parse(#[from] url::ParseError),

    #[error("has no host")]
    MissingHost,
}

/// Parse a proxy candidate as an absolute URL with a host.
///
/// Control characters are rejected outright; the URL parser would otherwise
/// strip tabs and newlines and accept the result.
pub fn parse_candidate(candidate: &str) -> Result<Url, CandidateError> {
    if candidate.chars().any(char::is_control) {
        return Err(CandidateError::ControlCharacters);
    }

    let url = Url::parse(candidate)?;
    if url.host().is_none() {
        return Err(CandidateError::MissingHost);
    }
    Ok(url)
}

/// Probe target for `base_url`.
pub fn health_check_target(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), HEALTH_CHECK_PATH)
}

/// Picks the first healthy proxy from an ordered candidate list.
#[derive(Debug, Clone)]
pub struct ProxySelector<P> {
    probe: P,
    strategy: ProbeStrategy,
}

impl<P: ProxyProbe> ProxySelector<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            strategy: ProbeStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ProbeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Select a proxy for reaching `base_url`.
    ///
    /// Returns the first candidate whose probe answers 200, the first
    /// candidate if none does, or `None` for an empty list.
    pub async fn select(&self, candidates: &[String], base_url: &str) -> Option<String> {
        let fallback = candidates.first()?;
        let target = health_check_target(base_url);

        let parsed: Vec<(&String, Url)> = candidates
            .iter()
            .filter_map(|candidate| match parse_candidate(candidate) {
                Ok(url) => Some((candidate, url)),
                Err(e) => {
                    tracing::debug!(
                        proxy = %candidate.escape_debug(),
                        error = %e,
                        "proxy-url could not be parsed, skipping"
                    );
                    None
                }
            })
            .collect();

        let healthy = match self.strategy {
            ProbeStrategy::Sequential => self.first_healthy_sequential(&parsed, &target).await,
            ProbeStrategy::Concurrent => self.first_healthy_concurrent(&parsed, &target).await,
        };

        match healthy {
            Some(proxy) => {
                tracing::debug!(proxy = %proxy, "Proxy passed health check");
                Some(proxy.clone())
            }
            None => {
                tracing::info!(
                    proxy = %fallback,
                    "Falling back to first proxy-url after all proxies failed health checks"
                );
                Some(fallback.clone())
            }
        }
    }

    async fn first_healthy_sequential<'a>(
        &self,
        parsed: &[(&'a String, Url)],
        target: &str,
    ) -> Option<&'a String> {
        for (candidate, url) in parsed {
            let outcome = self.probe.probe(url, target).await;
            if passed(candidate, &outcome) {
                return Some(*candidate);
            }
        }
        None
    }

    async fn first_healthy_concurrent<'a>(
        &self,
        parsed: &[(&'a String, Url)],
        target: &str,
    ) -> Option<&'a String> {
        let mut pending: FuturesOrdered<_> = parsed
            .iter()
            .map(|(candidate, url)| async move {
                (*candidate, self.probe.probe(url, target).await)
            })
            .collect();

        // Outcomes arrive in list order; dropping `pending` cancels the rest.
        while let Some((candidate, outcome)) = pending.next().await {
            if passed(candidate, &outcome) {
                return Some(candidate);
            }
        }
        None
    }
}

fn passed(candidate: &str, outcome: &Result<u16, ProbeError>) -> bool {
    match outcome {
        Ok(200) => true,
        Ok(status) => {
            tracing::info!(
                proxy = %candidate,
                status = status,
                "Proxy did not pass health check, expected response code 200, discarding"
            );
            false
        }
        Err(e) => {
            tracing::info!(proxy = %candidate, error = %e, "Proxy returned an error");
            false
        }
    }
}
