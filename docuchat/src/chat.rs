//! Conversation history and the query/response exchange.
//!
//! Sending is two-phase: the user's message is committed to history
//! immediately and never rolled back; the reply (or error text) is a
//! separate entry committed when the request resolves.

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::models::{ChatMessage, MessageId, MessageIdGen, Source};

/// Canned prompts offered while the conversation is empty.
pub const SUGGESTED_PROMPTS: [&str; 3] = [
    "Summarize this document",
    "What are the key points?",
    "Explain this content",
];

/// Assistant text when a query fails without a backend detail.
pub const QUERY_FAILED_MESSAGE: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// A query that has been committed locally and must be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub session_id: String,
    pub question: String,
    /// Id of the user message this query answers.
    pub message_id: MessageId,
    /// Session epoch at send time.
    pub epoch: u64,
}

/// Owns the conversation history and the pending input buffer.
#[derive(Debug, Default)]
pub struct ChatCoordinator {
    history: Vec<ChatMessage>,
    input: String,
    sending: bool,
    ids: MessageIdGen,
}

impl ChatCoordinator {
    /// Empty history, empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in append order.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Text the user is typing.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// True between [`Self::send`] and [`Self::finish`].
    pub const fn is_sending(&self) -> bool {
        self.sending
    }

    /// Send is enabled when idle and the input holds non-blank text.
    pub fn can_send(&self) -> bool {
        !self.sending && !self.input.trim().is_empty()
    }

    /// Suggested prompts, only while there is no history.
    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.history.is_empty() {
            &SUGGESTED_PROMPTS
        } else {
            &[]
        }
    }

    /// Commit `text` as a user message and clear the input buffer.
    ///
    /// Returns `None` for blank text. Callers gate on [`Self::is_sending`];
    /// this does not.
    pub fn send(&mut self, text: &str, session_id: &str, epoch: u64) -> Option<QueryTicket> {
        if text.trim().is_empty() {
            return None;
        }

        let now = Utc::now();
        let id = self.ids.next(now);
        self.history
            .push(ChatMessage::user(id, text.to_string(), now));
        self.input.clear();
        self.sending = true;
        debug!(session_id, message_id = %id, "user message committed");

        Some(QueryTicket {
            session_id: session_id.to_string(),
            question: text.to_string(),
            message_id: id,
            epoch,
        })
    }

    /// Send whatever is in the input buffer.
    pub fn send_input(&mut self, session_id: &str, epoch: u64) -> Option<QueryTicket> {
        let text = self.input.clone();
        self.send(&text, session_id, epoch)
    }

    /// Apply the outcome of a query. `sending` is always cleared; the reply
    /// is only appended when `current_epoch` still matches the ticket.
    pub fn finish(
        &mut self,
        ticket: &QueryTicket,
        current_epoch: u64,
        result: Result<(String, Vec<Source>), ApiError>,
    ) -> Option<&ChatMessage> {
        self.sending = false;

        if ticket.epoch != current_epoch {
            debug!(message_id = %ticket.message_id, "discarding reply for a reset session");
            return None;
        }

        let (text, sources) = match result {
            Ok(reply) => {
                debug!(message_id = %ticket.message_id, sources = reply.1.len(), "reply received");
                reply
            }
            Err(err) => {
                warn!(error = %err, "query failed");
                (err.user_message(QUERY_FAILED_MESSAGE), Vec::new())
            }
        };

        let now = Utc::now();
        let id = self.ids.next(now);
        self.history
            .push(ChatMessage::assistant(id, text, sources, now));
        self.history.last()
    }

    /// Drop all history; called when the session is reset or replaced.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::models::Sender;

    #[test]
    fn blank_text_is_ignored() {
        let mut chat = ChatCoordinator::new();
        assert!(chat.send("   \n\t", "s1", 0).is_none());
        assert!(chat.history().is_empty());
        assert!(!chat.is_sending());
    }

    #[test]
    fn user_message_is_committed_before_reply() {
        let mut chat = ChatCoordinator::new();
        chat.set_input("Summarize this document");

        let ticket = chat.send_input("s1", 0).unwrap();
        assert_eq!(chat.input(), "");
        assert!(chat.is_sending());
        assert_eq!(chat.history().len(), 1);
        assert_eq!(chat.history()[0].sender, Sender::User);
        assert_eq!(chat.history()[0].text, "Summarize this document");
        assert_eq!(ticket.question, "Summarize this document");

        let reply = chat
            .finish(&ticket, 0, Ok(("This is a summary.".to_string(), vec![])))
            .unwrap();
        assert_eq!(reply.sender, Sender::Assistant);
        assert_eq!(reply.text, "This is a summary.");
        assert!(reply.sources.is_empty());
        assert!(!chat.is_sending());

        assert_eq!(chat.history().len(), 2);
        assert!(chat.history()[1].id > chat.history()[0].id);
    }

    #[test]
    fn failure_keeps_user_message_and_appends_detail() {
        let mut chat = ChatCoordinator::new();
        let ticket = chat.send("What are the key points?", "s1", 0).unwrap();

        let err = ApiError::Backend {
            status: StatusCode::NOT_FOUND,
            detail: Some("No documents uploaded".to_string()),
        };
        chat.finish(&ticket, 0, Err(err));

        assert_eq!(chat.history().len(), 2);
        assert_eq!(chat.history()[0].sender, Sender::User);
        assert_eq!(chat.history()[1].text, "No documents uploaded");
        assert!(chat.history()[1].sources.is_empty());
        assert!(!chat.is_sending());
    }

    #[test]
    fn failure_without_detail_apologises() {
        let mut chat = ChatCoordinator::new();
        let ticket = chat.send("hi", "s1", 0).unwrap();
        chat.finish(&ticket, 0, Err(ApiError::Decode("eof".to_string())));
        assert_eq!(chat.history()[1].text, QUERY_FAILED_MESSAGE);
    }

    #[test]
    fn reply_for_reset_session_is_dropped() {
        let mut chat = ChatCoordinator::new();
        let ticket = chat.send("hi", "s1", 0).unwrap();
        chat.reset();

        assert!(chat.finish(&ticket, 1, Ok(("late".to_string(), vec![]))).is_none());
        assert!(chat.history().is_empty());
        assert!(!chat.is_sending());
    }

    #[test]
    fn suggestions_only_while_empty() {
        let mut chat = ChatCoordinator::new();
        assert_eq!(chat.suggestions(), SUGGESTED_PROMPTS);
        chat.send(SUGGESTED_PROMPTS[1], "s1", 0);
        assert!(chat.suggestions().is_empty());
    }

    #[test]
    fn every_reply_sorts_after_its_question() {
        let mut chat = ChatCoordinator::new();
        for i in 0..20 {
            let ticket = chat.send(&format!("q{i}"), "s1", 0).unwrap();
            chat.finish(&ticket, 0, Ok((format!("a{i}"), vec![])));
        }

        for pair in chat.history().windows(2) {
            assert!(pair[0].id < pair[1].id);
            if pair[1].sender == Sender::Assistant {
                assert_eq!(pair[0].sender, Sender::User);
            }
        }
    }
}
