use serde::{Deserialize, Serialize};

/// Hard cap on the number of turns returned to the client.
pub const MAX_HISTORY: usize = 10;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Speaker label used when flattening the history into a prompt.
    pub fn label(self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}


#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}


/// Ordered conversation, oldest turn first.
///
/// Serialized as a bare JSON array so it travels unchanged between the
/// client and the endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ChatHistory(Vec<Turn>);

impl ChatHistory {
    /// History holding only the persona turn.
    pub fn seeded(system_prompt: &str) -> Self {
        Self(vec![Turn::system(system_prompt)])
    }

    pub fn push_user(&mut self, content: String) {
        self.0.push(Turn::user(content));
    }

    pub fn push_assistant(&mut self, content: String) {
        self.0.push(Turn::assistant(content));
    }

    /// Keeps only the last `max` turns. System turns get no special treatment.
    pub fn trim_to(&mut self, max: usize) {
        if self.0.len() > max {
            let excess = self.0.len() - max;
            self.0.drain(..excess);
        }
    }

    pub fn render_transcript(&self) -> String {
        self.0
            .iter()
            .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Turn>> for ChatHistory {
    fn from(turns: Vec<Turn>) -> Self {
        Self(turns)
    }
}
