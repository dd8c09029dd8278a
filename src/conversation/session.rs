use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chain::TriageReport;

/// Who said a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// State of one conversation, owned by whoever serves it.
///
/// Lifecycle: create, append turns, read history.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationSession {
    turns: Vec<ChatTurn>,
    greeted: bool,
    last_triage: Option<TriageReport>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(ChatRole::User, content.into());
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(ChatRole::Assistant, content.into());
    }

    fn push(&mut self, role: ChatRole, content: String) {
        self.turns.push(ChatTurn {
            role,
            content,
            at: Utc::now(),
        });
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// Number of replies given so far.
    pub fn assistant_turns(&self) -> usize {
        self.turns
            .iter()
            .filter(|turn| turn.role == ChatRole::Assistant)
            .count()
    }

    pub fn last_user_message(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == ChatRole::User)
            .map(|turn| turn.content.as_str())
    }

    pub fn greeted(&self) -> bool {
        self.greeted
    }

    pub fn mark_greeted(&mut self) {
        self.greeted = true;
    }

    /// Chain output for the most recent symptom analysis.
    pub fn last_triage(&self) -> Option<&TriageReport> {
        self.last_triage.as_ref()
    }

    pub(crate) fn set_last_triage(&mut self, report: TriageReport) {
        self.last_triage = Some(report);
    }
}
