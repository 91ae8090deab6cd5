use async_trait::async_trait;
use std::time::Duration;

use crate::data_models::{SearchRequest, SearchResult};
use crate::error::{Result, SearchError};

use super::models::{HealthResponse, interpret_search_response};

/// The automation server, as seen by the controller and the health probe.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn health(&self) -> Result<HealthResponse>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResult>;
}

/// `Backend` over HTTP.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// `timeout` of `None` leaves requests unbounded.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SearchError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config() -> Result<Self> {
        let config = &crate::config::CONFIG;
        Self::with_timeout(config.base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn health(&self) -> Result<HealthResponse> {
        let res = self.client.get(self.url("/health")).send().await?;
        let health = res.json::<HealthResponse>().await?;
        Ok(health)
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResult> {
        let res = self
            .client
            .post(self.url("/api/search"))
            .json(request)
            .send()
            .await?;
        let status = res.status().as_u16();
        let body = res.text().await?;
        interpret_search_response(status, &body)
    }
}
