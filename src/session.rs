//! Per-session state: the chat transcript and the last produced answer.
//!
//! Owned by the pipeline driver — created at session start, dropped at
//! session end. Single writer, read-only to the rendering steps.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// Append-only transcript plus the single-slot "last answer" read by the
/// chart and document steps.
#[derive(Debug, Default)]
pub struct SessionContext {
    turns: Vec<ChatTurn>,
    last_answer: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: &str) {
        self.turns.push(ChatTurn {
            role: Role::User,
            content: content.to_string(),
            at: Utc::now(),
        });
    }

    /// Record an assistant turn; also overwrites the last-answer slot.
    pub fn push_assistant(&mut self, content: &str) {
        self.turns.push(ChatTurn {
            role: Role::Assistant,
            content: content.to_string(),
            at: Utc::now(),
        });
        self.last_answer = Some(content.to_string());
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn last_answer(&self) -> Option<&str> {
        self.last_answer.as_deref()
    }
}
