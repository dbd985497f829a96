use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an expert medical assistant providing accurate, responsible and helpful medical advice.";

/// Server configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub tavily_api_key: String,
    pub tavily_base_url: String,
    pub system_prompt: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Both provider keys are required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| get(name).ok_or_else(|| anyhow!("{name} is not set"));
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let bind_addr = or_default("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("invalid BIND_ADDR: {bind_addr}"))?;

        Ok(Self {
            bind_addr,
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_model: or_default("GEMINI_MODEL", DEFAULT_MODEL),
            gemini_base_url: or_default("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            tavily_api_key: require("TAVILY_API_KEY")?,
            tavily_base_url: or_default("TAVILY_BASE_URL", DEFAULT_TAVILY_BASE_URL),
            system_prompt: or_default("SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT),
        })
    }
}
