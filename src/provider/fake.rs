//! Scripted stand-ins for the providers, recording every call in order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;

use super::{GenerationRequest, GenerativeModel, SearchAnswer, SearchQuery, WebSearch};

#[derive(Clone, Debug)]
pub enum Call {
    Generate(GenerationRequest),
    Search(SearchQuery),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    log: CallLog,
}

impl ScriptedModel {
    pub fn new(log: CallLog, replies: Vec<Result<&str, &str>>) -> Self {
        let replies = replies
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        Self { replies: Mutex::new(replies), log }
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: GenerationRequest) -> anyhow::Result<String> {
        self.log.lock().unwrap().push(Call::Generate(request));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted reply left")),
        }
    }
}

pub struct ScriptedSearch {
    outcome: Result<Option<String>, String>,
    log: CallLog,
}

impl ScriptedSearch {
    pub fn answering(log: CallLog, answer: Option<&str>) -> Self {
        Self { outcome: Ok(answer.map(str::to_string)), log }
    }

    pub fn failing(log: CallLog, message: &str) -> Self {
        Self { outcome: Err(message.to_string()), log }
    }
}

#[async_trait]
impl WebSearch for ScriptedSearch {
    async fn search(&self, query: &SearchQuery) -> anyhow::Result<SearchAnswer> {
        self.log.lock().unwrap().push(Call::Search(query.clone()));
        match &self.outcome {
            Ok(answer) => Ok(SearchAnswer { answer: answer.clone() }),
            Err(message) => Err(anyhow!(message.clone())),
        }
    }
}
