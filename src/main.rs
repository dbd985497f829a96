use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use medassist_chat::config::Config;
use medassist_chat::provider::{GeminiClient, TavilyClient};
use medassist_chat::{app, AppState, Orchestrator};


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let model = GeminiClient::new(&config.gemini_base_url, &config.gemini_model, &config.gemini_api_key);
    let search = TavilyClient::new(&config.tavily_base_url, &config.tavily_api_key);
    let orchestrator = Orchestrator::new(Arc::new(model), Arc::new(search), &config.system_prompt);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, model = %config.gemini_model, "chat server listening");

    axum::serve(listener, app(AppState::new(orchestrator))).await?;
    Ok(())
}
