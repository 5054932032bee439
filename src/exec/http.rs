//! HTTP access for URL health checks and webhook notifications

use crate::errors::{Result, WatchdogError};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Minimal HTTP surface the watchdog needs
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a request and return the response status code
    async fn status(&self, method: &str, url: &str, limit: Duration) -> Result<u16>;

    /// POST a JSON body and return the response status code
    async fn post_json(&self, url: &str, body: &serde_json::Value, limit: Duration) -> Result<u16>;
}

/// reqwest-backed client
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn status(&self, method: &str, url: &str, limit: Duration) -> Result<u16> {
        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|e| WatchdogError::ProbeError(format!("Invalid HTTP method {}: {}", method, e)))?;

        let response = self
            .client
            .request(method, url)
            .timeout(limit)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value, limit: Duration) -> Result<u16> {
        let response = self
            .client
            .post(url)
            .json(body)
            .timeout(limit)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }
}

/// Passes reads through and logs writes instead of sending them
pub struct DryRunHttp {
    inner: Arc<dyn HttpClient>,
}

impl DryRunHttp {
    pub fn new(inner: Arc<dyn HttpClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpClient for DryRunHttp {
    async fn status(&self, method: &str, url: &str, limit: Duration) -> Result<u16> {
        self.inner.status(method, url, limit).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value, _limit: Duration) -> Result<u16> {
        let text = body
            .get("text")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());
        info!("[DRY-RUN] webhook POST to {}: {}", url, text);
        Ok(200)
    }
}
