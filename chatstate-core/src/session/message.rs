//! Conversation data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in a conversation
///
/// Immutable once appended; the timestamp is assigned by the log at
/// write time, never by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,
    /// Message content
    pub content: String,
    /// Write-time timestamp, non-decreasing within a session
    pub timestamp_utc: DateTime<Utc>,
}

/// A read view over a session at a point in time
///
/// Derived from log contents on demand; never persisted. The message
/// sequence is always a time-prefix of the full log for the assistant.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantState {
    /// Assistant id the state was derived for
    pub assistant_id: String,
    /// Instructions bound at creation
    pub instructions: String,
    messages: Vec<Message>,
    #[serde(skip)]
    latest_answer: Option<usize>,
}

impl AssistantState {
    /// Build a state view over an ordered message sequence
    pub fn new(
        assistant_id: impl Into<String>,
        instructions: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        // Resolved once here so latest_answer() stays O(1) on the hot path
        let latest_answer = messages.iter().rposition(|m| m.role == Role::Assistant);
        Self {
            assistant_id: assistant_id.into(),
            instructions: instructions.into(),
            messages,
            latest_answer,
        }
    }

    /// Messages in timestamp order, ties in append order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent assistant message, if any turn has been answered
    pub fn latest_answer(&self) -> Option<&Message> {
        self.latest_answer.map(|i| &self.messages[i])
    }
}
