//! Chat message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
    /// System-generated message.
    System,
}

/// A single message stored in a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique within the owning session (UUID format).
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
    /// Case the message was written about, if any.
    #[serde(default)]
    pub case_id: Option<String>,
}

/// Input for appending a message: everything but the store-assigned id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub role: MessageRole,
    pub content: String,
    pub case_id: Option<String>,
}

impl NewMessage {
    pub fn user(content: impl Into<String>, case_id: Option<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            case_id,
        }
    }

    pub fn assistant(content: impl Into<String>, case_id: Option<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            case_id,
        }
    }
}
