//! Chat use case implementation.
//!
//! `ChatUseCase` runs one chat turn at a time per session: it stores the
//! user message, builds the case-grounded prompt, calls the completion
//! client and writes the answer back into the [`SessionStore`].

use futures::StreamExt;
use regdesk_core::case::CaseRepository;
use regdesk_core::chat::{ChatMessage, ChatSession, NewMessage, SessionStore};
use regdesk_core::completion::{CompletionClient, PromptMessage};
use regdesk_core::prompt::{build_system_prompt, welcome_message};
use regdesk_core::{RegdeskError, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Banner shown for any failed turn.
pub const RESPONSE_FAILED_TEXT: &str = "Failed to get response. Please try again.";
/// Banner shown when a turn is rejected because another one is running.
pub const SESSION_BUSY_TEXT: &str = "Still answering the previous message. Please wait.";
/// Banner shown when the user cancelled a streamed answer.
pub const RESPONSE_CANCELLED_TEXT: &str = "Response cancelled.";

/// Collapses any turn failure into the text shown to the user.
pub fn user_facing_error(err: &RegdeskError) -> &'static str {
    match err {
        RegdeskError::SessionBusy { .. } => SESSION_BUSY_TEXT,
        RegdeskError::Cancelled => RESPONSE_CANCELLED_TEXT,
        _ => RESPONSE_FAILED_TEXT,
    }
}

/// Use case for chatting about regulatory cases.
///
/// # Turn lifecycle
///
/// `idle -> sending -> streaming -> idle`, or `-> error -> idle`. The
/// session is claimed through [`SessionStore::begin_turn`], so a second
/// send on the same session fails with `SessionBusy` until the first one
/// returns. Partial answers are never rolled back.
#[derive(Clone)]
pub struct ChatUseCase {
    cases: Arc<dyn CaseRepository>,
    store: SessionStore,
    client: Arc<dyn CompletionClient>,
}

impl ChatUseCase {
    pub fn new(
        cases: Arc<dyn CaseRepository>,
        store: SessionStore,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self { cases, store, client }
    }

    /// Opens a new session for `case_id`, seeded with the welcome message.
    pub fn start_chat(&self, case_id: &str) -> Result<ChatSession> {
        let session = self.store.create_session(self.cases.as_ref(), case_id);
        self.store.append_message(
            &session.id,
            NewMessage::assistant(welcome_message(&session.case_name), Some(case_id.to_string())),
        )?;
        self.session(&session.id)
    }

    /// Returns a snapshot of the session.
    pub fn session(&self, session_id: &str) -> Result<ChatSession> {
        self.store
            .get_session(session_id)
            .ok_or_else(|| RegdeskError::not_found("session", session_id))
    }

    pub fn sessions_for_case(&self, case_id: &str) -> Vec<ChatSession> {
        self.store.sessions_for_case(case_id)
    }

    /// Drops the session's messages. Refused while a turn is running.
    pub fn clear_chat(&self, session_id: &str) -> Result<()> {
        let _turn = self.store.begin_turn(session_id)?;
        self.store.clear_session(session_id)
    }

    /// The message list sent to the provider: the case system prompt
    /// followed by the session history.
    pub fn conversation_for(&self, session_id: &str) -> Result<Vec<PromptMessage>> {
        let session = self.session(session_id)?;
        let mut messages = Vec::with_capacity(session.messages.len() + 1);
        messages.push(PromptMessage::system(build_system_prompt(
            self.cases.as_ref(),
            &session.case_id,
        )));
        messages.extend(session.messages.iter().map(PromptMessage::from));
        Ok(messages)
    }

    /// Sends a user message and stores the complete answer.
    pub async fn send_message(&self, session_id: &str, text: &str) -> Result<ChatMessage> {
        let text = non_empty(text)?;
        let turn = self.store.begin_turn(session_id)?;
        let case_id = self.append_user_message(session_id, text)?;

        let prompt = self.conversation_for(session_id)?;
        let answer = self.client.complete_once(&prompt).await.inspect_err(|e| {
            tracing::warn!(session_id, "Completion failed: {e}");
        })?;

        let stored = self
            .store
            .append_message(session_id, NewMessage::assistant(answer, Some(case_id)))?;
        drop(turn);
        Ok(stored)
    }

    /// Sends a user message and streams the answer into the session.
    ///
    /// An empty assistant message is appended once the provider accepts
    /// the request; each fragment extends it in arrival order and is also
    /// handed to `on_fragment`. Returns the final assistant message.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for blank text
    /// - `NotFound` / `SessionBusy` from the store
    /// - `Provider` when the request fails or the stream breaks
    /// - `Cancelled` when `cancel` fires first
    ///
    /// After `Provider` or `Cancelled` the assistant message keeps whatever
    /// content arrived.
    pub async fn send_message_streaming<F>(
        &self,
        session_id: &str,
        text: &str,
        cancel: &CancellationToken,
        mut on_fragment: F,
    ) -> Result<ChatMessage>
    where
        F: FnMut(&str) + Send,
    {
        let text = non_empty(text)?;
        let turn = self.store.begin_turn(session_id)?;
        let case_id = self.append_user_message(session_id, text)?;
        let prompt = self.conversation_for(session_id)?;

        let mut fragments = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(session_id, "Turn cancelled before streaming");
                return Err(RegdeskError::Cancelled);
            }
            result = self.client.complete_streaming(&prompt) => result.inspect_err(|e| {
                tracing::warn!(session_id, "Completion failed: {e}");
            })?,
        };

        turn.mark_streaming();
        let mut answer = self
            .store
            .append_message(session_id, NewMessage::assistant("", Some(case_id)))?;
        let mut content = String::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(
                        session_id,
                        received = content.len(),
                        "Turn cancelled mid-stream"
                    );
                    return Err(RegdeskError::Cancelled);
                }
                next = fragments.next() => next,
            };

            match next {
                Some(Ok(fragment)) => {
                    content.push_str(&fragment);
                    answer = self
                        .store
                        .update_message_content(session_id, &answer.id, content.as_str())?;
                    on_fragment(&fragment);
                }
                Some(Err(e)) => {
                    tracing::warn!(session_id, received = content.len(), "Stream failed: {e}");
                    return Err(e);
                }
                None => break,
            }
        }

        tracing::debug!(session_id, chars = content.len(), "Turn completed");
        drop(turn);
        Ok(answer)
    }

    fn append_user_message(&self, session_id: &str, text: &str) -> Result<String> {
        let session = self.session(session_id)?;
        self.store
            .append_message(session_id, NewMessage::user(text, Some(session.case_id.clone())))?;
        Ok(session.case_id)
    }
}

fn non_empty(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RegdeskError::InvalidInput("message is empty".into()));
    }
    Ok(trimmed)
}
