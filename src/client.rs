use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::conversation::ConversationStore;
use crate::error::ErrorResponse;
use crate::history::MAX_HISTORY;
use crate::types::{ChatRequest, ChatResponse, StatusResponse};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/chat";
pub const IMAGE_ONLY_PLACEHOLDER: &str = "Sent an image";

#[derive(Clone, Debug)]
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn status(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .context("chat endpoint unreachable")?
            .error_for_status()?;
        let status: StatusResponse = response.json().await?;
        Ok(status.message)
    }

    pub async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .context("chat endpoint unreachable")?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => format!("chat endpoint returned status {status}"),
            };
            bail!(message);
        }

        response.json().await.context("failed to parse chat response")
    }
}


/// A transcript bound to an endpoint.
///
/// `submit` takes `&mut self`, so a session has at most one request in flight.
pub struct ChatSession {
    pub store: ConversationStore,
    pub client: ChatClient,
    pub use_search: bool,
}

impl ChatSession {
    pub fn new(store: ConversationStore, client: ChatClient) -> Self {
        Self {
            store,
            client,
            use_search: false,
        }
    }

    /// Sends one turn. Returns `Ok(None)` without contacting the endpoint when
    /// there is neither a query nor an image.
    ///
    /// The user entry is appended before the request and removed again if it
    /// fails, so the transcript only ever holds exchanges the endpoint answered.
    pub async fn submit(&mut self, query: &str, image: Option<String>) -> Result<Option<String>> {
        if query.is_empty() && image.is_none() {
            return Ok(None);
        }

        let request = ChatRequest {
            query: Some(query.to_string()),
            image,
            chat_history: Some(self.store.request_history(MAX_HISTORY)),
            use_tavily: self.use_search,
        };

        let shown = if query.is_empty() { IMAGE_ONLY_PLACEHOLDER } else { query };
        self.store.push_user(shown)?;

        match self.client.send(&request).await {
            Ok(response) => {
                self.store.push_ai(response.reply.clone())?;
                Ok(Some(response.reply))
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed, rolling back user entry");
                self.store.pop_last()?;
                Err(e)
            }
        }
    }
}


/// Reads an image file into a data URI suitable for [`ChatRequest::image`].
pub fn image_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}
