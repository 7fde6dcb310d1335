//! Chat message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the user.
    User,
    /// Reply (or error text) produced for the user.
    Assistant,
}

/// A citation backing part of an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Name of the cited document.
    pub filename: String,
    /// Page number, when the backend knows it.
    pub page: Option<u32>,
    /// Excerpt from the cited passage.
    pub snippet: Option<String>,
}

/// Time-ordered message identifier.
///
/// Values are milliseconds since the Unix epoch, bumped forward when two
/// messages would otherwise share a millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out strictly increasing [`MessageId`]s.
#[derive(Debug, Default)]
pub struct MessageIdGen {
    last: u64,
}

impl MessageIdGen {
    /// Next id for a message created at `now`.
    pub fn next(&mut self, now: DateTime<Utc>) -> MessageId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        self.last = millis.max(self.last + 1);
        MessageId(self.last)
    }
}

/// A single entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    /// Citations, in the order the backend returned them.
    pub sources: Vec<Source>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// A message typed by the user. User messages carry no sources.
    pub fn user(id: MessageId, text: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            sender: Sender::User,
            text,
            sources: Vec::new(),
            timestamp,
        }
    }

    /// A reply, or the error text shown in place of one.
    pub fn assistant(
        id: MessageId,
        text: String,
        sources: Vec<Source>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            sender: Sender::Assistant,
            text,
            sources,
            timestamp,
        }
    }
}
