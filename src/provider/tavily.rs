use anyhow::{ensure, Context, Result};
use async_trait::async_trait;

use super::{SearchAnswer, SearchQuery, WebSearch};

#[derive(Clone, Debug)]
pub struct TavilyClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TavilyClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchAnswer> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(query)
            .send()
            .await
            .context("Tavily Search request failed")?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, "Tavily Search error");
        }
        ensure!(status.is_success(), "Tavily Search request failed with status {}", status);

        response
            .json::<SearchAnswer>()
            .await
            .context("failed to parse Tavily Search response")
    }
}
