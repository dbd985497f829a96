use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use medassist_chat::client::{image_data_uri, ChatClient, ChatSession, DEFAULT_ENDPOINT};
use medassist_chat::conversation::{ConversationStore, LocalStorage, Speaker};

const HELP: &str = "commands: /image <path>, /search on|off, /history, /reset, /quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let endpoint = std::env::var("CHAT_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let data_dir = std::env::var("CHAT_DATA_DIR").unwrap_or_else(|_| ".".to_string());

    let store = ConversationStore::load(LocalStorage::new(data_dir))?;
    let client = ChatClient::new(endpoint);
    if let Err(e) = client.status().await {
        tracing::warn!(error = %e, "chat endpoint did not answer the liveness check");
    }

    let mut session = ChatSession::new(store, client);
    print_history(&session);
    println!("{HELP}");

    let mut pending_image: Option<String> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/help", _) => println!("{HELP}"),
            ("/history", _) => print_history(&session),
            ("/reset", _) => {
                session.store.reset()?;
                print_history(&session);
            }
            ("/search", arg) => {
                session.use_search = arg.trim() == "on";
                println!("web search {}", if session.use_search { "enabled" } else { "disabled" });
            }
            ("/image", arg) => match image_data_uri(Path::new(arg.trim())) {
                Ok(uri) => {
                    pending_image = Some(uri);
                    println!("image attached to the next message");
                }
                Err(e) => println!("error: {e:#}"),
            },
            _ => {
                if line.is_empty() && pending_image.is_none() {
                    continue;
                }
                println!("...");
                match session.submit(line, pending_image.take()).await {
                    Ok(Some(reply)) => println!("ai> {reply}"),
                    Ok(None) => {}
                    Err(e) => println!("error: {e:#}"),
                }
            }
        }
    }

    Ok(())
}

fn print_history(session: &ChatSession) {
    for entry in session.store.entries() {
        let who = match entry.speaker {
            Speaker::User => "you",
            Speaker::Ai => "ai",
        };
        println!("{who}> {}", entry.content);
    }
}
