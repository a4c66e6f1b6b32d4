//! Transcript
//!
//! Append-only chat history shared between the controller task and any
//! number of readers. Clones share the same underlying storage.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One rendered chat bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Shared append-only message list.
#[derive(Clone, Default)]
pub struct Transcript {
    messages: Arc<RwLock<Vec<ChatMessage>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, message: ChatMessage) {
        self.messages.write().push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    /// Snapshot of the current history, oldest first.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.read().clone()
    }

    pub fn last(&self) -> Option<ChatMessage> {
        self.messages.read().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let transcript = Transcript::new();
        transcript.append(ChatMessage::assistant("Welcome"));
        transcript.append(ChatMessage::user("Hi"));

        let snapshot = transcript.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].role, Role::Assistant);
        assert_eq!(snapshot[0].content, "Welcome");
        assert_eq!(snapshot[1].role, Role::User);
    }

    #[test]
    fn test_clones_share_storage() {
        let transcript = Transcript::new();
        let reader = transcript.clone();
        transcript.append(ChatMessage::user("Hello"));
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.last().unwrap().content, "Hello");
    }

    #[test]
    fn test_empty() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert!(transcript.last().is_none());
    }
}
