use std::sync::Arc;

use crate::error::ChatError;
use crate::history::MAX_HISTORY;
use crate::provider::{GenerationRequest, GenerativeModel, InlineImage, SearchQuery, WebSearch};
use crate::types::{image_payload, ChatRequest, ChatResponse};

pub const PRIMARY_MAX_TOKENS: u32 = 80;
pub const MERGE_MAX_TOKENS: u32 = 20;
pub const NO_SEARCH_ANSWER: &str = "No answer from Tavily Search.";


/// Runs one chat turn: model reply, optionally merged with a web search answer.
///
/// Built once at startup and shared by every request; holds no per-request state.
pub struct Orchestrator {
    model: Arc<dyn GenerativeModel>,
    search: Arc<dyn WebSearch>,
    system_prompt: String,
}

impl Orchestrator {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        search: Arc<dyn WebSearch>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model,
            search,
            system_prompt: system_prompt.into(),
        }
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let mut chat_history = request.history_or_seed(&self.system_prompt);

        let user_message_text = request.user_message_text();
        if user_message_text.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        chat_history.push_user(user_message_text);

        let transcript = chat_history.render_transcript();
        let image = request
            .attached_image()
            .map(|image| InlineImage::jpeg(image_payload(image)));

        tracing::debug!(turns = chat_history.len(), has_image = image.is_some(), "primary generation");
        let primary_reply = self
            .model
            .generate(GenerationRequest {
                prompt: transcript,
                image,
                max_output_tokens: PRIMARY_MAX_TOKENS,
            })
            .await
            .map_err(|e| ChatError::ModelProvider(format!("{e:#}")))?;

        let final_reply = if request.use_tavily {
            self.augment_with_search(request.query_text(), primary_reply).await?
        } else {
            primary_reply
        };

        chat_history.push_assistant(final_reply.clone());
        chat_history.trim_to(MAX_HISTORY);

        Ok(ChatResponse {
            reply: final_reply,
            chat_history,
        })
    }

    /// Searches for the raw query, then asks the model to merge both answers.
    /// A failed merge is an error; the primary reply is not used as a fallback.
    async fn augment_with_search(&self, query: &str, primary_reply: String) -> Result<String, ChatError> {
        tracing::info!(query, "augmenting reply with web search");
        let found = self
            .search
            .search(&SearchQuery::basic(query))
            .await
            .map_err(|e| ChatError::SearchProvider(format!("{e:#}")))?;

        let answer = found
            .answer
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| NO_SEARCH_ANSWER.to_string());

        self.model
            .generate(GenerationRequest {
                prompt: merge_prompt(&primary_reply, &answer),
                image: None,
                max_output_tokens: MERGE_MAX_TOKENS,
            })
            .await
            .map_err(|e| ChatError::ModelProvider(format!("{e:#}")))
    }
}

pub fn merge_prompt(model_reply: &str, search_answer: &str) -> String {
    format!(
        "Please combine the following responses into one coherent and user-relevant answer:\n\n\
         Gemini: {model_reply}\n\n\
         Tavily Search: {search_answer}"
    )
}
