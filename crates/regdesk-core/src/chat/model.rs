//! Chat session domain model.

use super::message::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name recorded on a session whose case could not be resolved.
pub const UNKNOWN_CASE_NAME: &str = "Unknown Case";

/// A conversation about one regulatory case.
///
/// The session refers to its case by identifier only; `case_name` is a
/// snapshot taken at creation so the session stays displayable even if
/// the case disappears from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Owning case identifier
    pub case_id: String,
    /// Case display name at creation time
    pub case_name: String,
    /// Messages in append order
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Returns the most recently appended message.
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Finds a message by ID.
    pub fn message(&self, message_id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == message_id)
    }
}
