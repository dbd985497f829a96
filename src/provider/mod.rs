//! External collaborators: the generative model and the web search service.
//!
//! Both sit behind object-safe traits so the orchestrator can be driven by
//! the real HTTP clients in production and by scripted fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod gemini;
pub mod tavily;

#[cfg(test)]
pub(crate) mod fake;

pub use gemini::GeminiClient;
pub use tavily::TavilyClient;

/// Image sent inline with a generation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 payload without any data URI header.
    pub data: String,
}

impl InlineImage {
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data: data.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<InlineImage>,
    /// Length hint, enforced by the provider.
    pub max_output_tokens: u32,
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Returns the generated text. Empty output is an error.
    async fn generate(&self, request: GenerationRequest) -> anyhow::Result<String>;
}


#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub topic: String,
    pub search_depth: String,
    pub max_results: u32,
    pub days: u32,
    pub include_answer: bool,
    pub include_raw_content: bool,
    pub include_images: bool,
    pub include_image_descriptions: bool,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
}

impl SearchQuery {
    /// One general result from the last three days, with an extractive answer and nothing else.
    pub fn basic(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            topic: "general".to_string(),
            search_depth: "basic".to_string(),
            max_results: 1,
            days: 3,
            include_answer: true,
            include_raw_content: false,
            include_images: false,
            include_image_descriptions: false,
            include_domains: vec![],
            exclude_domains: vec![],
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SearchAnswer {
    #[serde(default)]
    pub answer: Option<String>,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> anyhow::Result<SearchAnswer>;
}
