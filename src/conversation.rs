//! Client-side transcript.
//!
//! The client speaks of `user` and `ai` entries while the endpoint uses
//! `user`/`assistant`/`system` roles; the conversion lives here and nowhere
//! else. The full transcript is persisted untrimmed under a fixed key.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::history::{ChatHistory, Role, Turn};

pub const STORAGE_KEY: &str = "conversationHistory";
pub const GREETING: &str = "Hello, I'm your medical assistant. How can I help you today?";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Ai,
}

impl From<Speaker> for Role {
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::User => Role::User,
            Speaker::Ai => Role::Assistant,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("role {0:?} has no client-side speaker")]
pub struct UnmappedRole(pub Role);

impl TryFrom<Role> for Speaker {
    type Error = UnmappedRole;

    fn try_from(role: Role) -> Result<Self, Self::Error> {
        match role {
            Role::User => Ok(Speaker::User),
            Role::Assistant => Ok(Speaker::Ai),
            Role::System => Err(UnmappedRole(role)),
        }
    }
}


#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    #[serde(rename = "type")]
    pub speaker: Speaker,
    pub content: String,
}

impl Entry {
    pub fn user(content: impl Into<String>) -> Self {
        Self { speaker: Speaker::User, content: content.into() }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self { speaker: Speaker::Ai, content: content.into() }
    }

    pub fn to_turn(&self) -> Turn {
        Turn {
            role: self.speaker.into(),
            content: self.content.clone(),
        }
    }
}


/// Key-value store on the local filesystem, one JSON document per key.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {key}")),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        fs::write(self.path(key), value).with_context(|| format!("failed to write {key}"))
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                Err(e).with_context(|| format!("failed to remove {key}"))
            }
            _ => Ok(()),
        }
    }
}


pub struct ConversationStore {
    entries: Vec<Entry>,
    storage: LocalStorage,
}

impl ConversationStore {
    /// Restores the persisted transcript, or starts from the greeting.
    pub fn load(storage: LocalStorage) -> Result<Self> {
        let entries = match storage.get(STORAGE_KEY)? {
            Some(json) => serde_json::from_str(&json).context("stored conversation is not valid JSON")?,
            None => vec![Entry::ai(GREETING)],
        };
        Ok(Self { entries, storage })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> Result<()> {
        self.entries.push(Entry::user(content));
        self.persist()
    }

    pub fn push_ai(&mut self, content: impl Into<String>) -> Result<()> {
        self.entries.push(Entry::ai(content));
        self.persist()
    }

    pub fn pop_last(&mut self) -> Result<Option<Entry>> {
        let popped = self.entries.pop();
        self.persist()?;
        Ok(popped)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.entries = vec![Entry::ai(GREETING)];
        self.storage.remove(STORAGE_KEY)
    }

    /// The last `window` entries in the endpoint's wire format.
    pub fn request_history(&self, window: usize) -> ChatHistory {
        let start = self.entries.len().saturating_sub(window);
        self.entries[start..].iter().map(Entry::to_turn).collect::<Vec<_>>().into()
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.entries)?;
        self.storage.set(STORAGE_KEY, &json)
    }
}
