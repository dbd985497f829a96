use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};


#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}


/// Failures of the chat endpoint. Every kind surfaces as HTTP 500.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Empty message: provide a query or an image")]
    EmptyInput,
    #[error("model provider error: {0}")]
    ModelProvider(String),
    #[error("search provider error: {0}")]
    SearchProvider(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "chat request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: self.to_string() }),
        )
            .into_response()
    }
}
