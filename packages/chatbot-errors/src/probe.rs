//! Connectivity probe for chat API endpoints.
//!
//! Sends a `GET` to each endpoint and reports failures through the same
//! taxonomy callers see from real requests.

use std::time::{Duration, Instant};

use futures::future::join_all;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::config::ProbeConfig;
use crate::error::{ChatBotError, ClientError, Result};
use crate::response::RawResponse;

/// A successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub url: String,
    pub status: u16,
    pub elapsed: Duration,
}

/// Checks endpoint reachability with a shared HTTP client.
#[derive(Debug, Clone)]
pub struct Prober {
    http: Client,
}

impl Prober {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { http })
    }

    /// Use an existing client (custom TLS, proxies, etc.).
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Probe a single endpoint.
    pub async fn check(&self, url: &str) -> Result<ProbeReport> {
        let endpoint = parse_endpoint(url)?;
        let start = Instant::now();

        let response = self.http.get(endpoint).send().await.map_err(|e| {
            if e.is_connect() {
                warn!(url, error = %e, "Chat gateway unreachable");
                ChatBotError::GatewayNotFound
            } else {
                warn!(url, error = %e, "Probe request failed");
                ChatBotError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let raw = RawResponse::read(response).await;
            let error = ChatBotError::from_response(&raw, raw.message().as_ref());
            warn!(url, status = %status, error = %error, "Probe endpoint returned an error");
            return Err(error);
        }

        let report = ProbeReport {
            url: url.to_string(),
            status: status.as_u16(),
            elapsed: start.elapsed(),
        };

        debug!(
            url,
            status = report.status,
            duration_ms = report.elapsed.as_millis(),
            "Probe succeeded"
        );

        Ok(report)
    }

    /// Probe every endpoint concurrently. Results keep the input order.
    pub async fn check_all<S: AsRef<str>>(&self, urls: &[S]) -> Vec<(String, Result<ProbeReport>)> {
        join_all(urls.iter().map(|url| async move {
            let url = url.as_ref();
            (url.to_string(), self.check(url).await)
        }))
        .await
    }
}

fn parse_endpoint(url: &str) -> Result<Url> {
    match Url::parse(url) {
        Ok(endpoint) if matches!(endpoint.scheme(), "http" | "https") => Ok(endpoint),
        _ => Err(ClientError::InvalidUrl(url.to_string()).into()),
    }
}
