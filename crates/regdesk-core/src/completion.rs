//! Completion provider interface.
//!
//! Concrete clients live in `regdesk-interaction`; the application layer
//! only sees this trait.

use crate::chat::{ChatMessage, MessageRole};
use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// One `{role, content}` pair sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for PromptMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Text fragments of a streamed answer, in arrival order.
///
/// The stream is finite and cannot be restarted. A broken stream yields a
/// single `Err` item and then ends.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A hosted text-generation provider.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Waits for the whole answer and returns it.
    async fn complete_once(&self, messages: &[PromptMessage]) -> Result<String>;

    /// Starts a streamed answer.
    ///
    /// Errors that happen before the first fragment (connection, HTTP
    /// status) are returned directly; later ones arrive inside the stream.
    async fn complete_streaming(&self, messages: &[PromptMessage]) -> Result<FragmentStream>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn prompt_message_copies_role_and_content() {
        let message = ChatMessage {
            id: "m1".into(),
            role: MessageRole::Assistant,
            content: "Hello".into(),
            timestamp: Utc::now(),
            case_id: Some("case-001".into()),
        };

        let prompt = PromptMessage::from(&message);
        assert_eq!(prompt.role, MessageRole::Assistant);
        assert_eq!(prompt.content, "Hello");
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&PromptMessage::system("x")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"x"}"#);
    }
}
