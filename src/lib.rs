pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod handler;
pub mod history;
pub mod pipeline;
pub mod provider;
pub mod types;

pub use handler::{app, AppState};
pub use pipeline::Orchestrator;
