use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json,
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::error::ChatError;
use crate::pipeline::Orchestrator;
use crate::types::{ChatRequest, ChatResponse, StatusResponse, STATUS_MESSAGE};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}


pub async fn chat_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: STATUS_MESSAGE.to_string(),
    })
}

pub async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    // Malformed bodies go through the same 500 path as every other failure.
    let Json(req) = body.map_err(|e| ChatError::Unexpected(e.body_text()))?;

    tracing::info!(
        query = req.query_text(),
        has_image = req.attached_image().is_some(),
        history_len = req.chat_history.as_ref().map(|h| h.len()).unwrap_or(0),
        use_tavily = req.use_tavily,
        "chat request"
    );

    let response = state.orchestrator.handle(req).await?;
    Ok(Json(response))
}


pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/chat", get(chat_status).post(chat_handler))
}

/// Full application with tracing, CORS and compression layers.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(state)
}
