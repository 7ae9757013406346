use super::message::{ChatMessage, NewMessage};
use super::model::{ChatSession, UNKNOWN_CASE_NAME};
use crate::case::CaseRepository;
use crate::error::{RegdeskError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Progress of the chat turn currently running on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    /// Ready to accept a new message.
    #[default]
    Idle,
    /// User message stored, waiting for the provider to answer.
    Sending,
    /// Provider is streaming fragments into the assistant message.
    Streaming,
}

struct Entry {
    session: ChatSession,
    turn: TurnState,
}

#[derive(Default)]
struct StoreState {
    /// Sessions in creation order
    entries: Vec<Entry>,
    /// Session ID -> position in `entries`
    index: HashMap<String, usize>,
}

impl StoreState {
    fn entry(&self, session_id: &str) -> Option<&Entry> {
        self.index.get(session_id).map(|&i| &self.entries[i])
    }

    fn entry_mut(&mut self, session_id: &str) -> Result<&mut Entry> {
        match self.index.get(session_id) {
            Some(&i) => Ok(&mut self.entries[i]),
            None => Err(RegdeskError::not_found("session", session_id)),
        }
    }
}

/// In-memory store of chat sessions.
///
/// `SessionStore` is a cheap, cloneable handle: clones share the same
/// sessions. Each application (or test) constructs its own store, so there
/// is no process-wide session list. Every operation takes the lock for its
/// whole read-modify-write and never across an `.await`, which keeps the
/// store safe to share between tasks on a multi-threaded runtime.
///
/// Sessions live until the store is dropped; there is no persistence.
#[derive(Clone, Default)]
pub struct SessionStore {
    state: Arc<RwLock<StoreState>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates an empty session for `case_id` and returns a snapshot of it.
    ///
    /// The case name is resolved through `cases`; an unknown case is
    /// recorded as [`UNKNOWN_CASE_NAME`] rather than rejected.
    pub fn create_session(&self, cases: &dyn CaseRepository, case_id: &str) -> ChatSession {
        let case_name = cases
            .find_by_id(case_id)
            .map(|c| c.name)
            .unwrap_or_else(|| UNKNOWN_CASE_NAME.to_string());

        let now = Utc::now();
        let session = ChatSession {
            id: Uuid::new_v4().to_string(),
            case_id: case_id.to_string(),
            case_name,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let mut state = self.write();
        let position = state.entries.len();
        state.index.insert(session.id.clone(), position);
        state.entries.push(Entry {
            session: session.clone(),
            turn: TurnState::Idle,
        });

        tracing::info!(session_id = %session.id, case_id, "Created chat session");
        session
    }

    /// Returns a snapshot of the session, or `None` if it was never created.
    pub fn get_session(&self, session_id: &str) -> Option<ChatSession> {
        self.read().entry(session_id).map(|e| e.session.clone())
    }

    /// Returns all sessions owned by `case_id`, in creation order.
    pub fn sessions_for_case(&self, case_id: &str) -> Vec<ChatSession> {
        self.read()
            .entries
            .iter()
            .filter(|e| e.session.case_id == case_id)
            .map(|e| e.session.clone())
            .collect()
    }

    /// Returns every session, in creation order.
    pub fn list_sessions(&self) -> Vec<ChatSession> {
        self.read().entries.iter().map(|e| e.session.clone()).collect()
    }

    /// Appends a message to a session.
    ///
    /// Assigns a fresh message ID and timestamp and bumps the session's
    /// `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the session does not exist; no session is
    /// modified in that case.
    pub fn append_message(&self, session_id: &str, message: NewMessage) -> Result<ChatMessage> {
        let mut state = self.write();
        let entry = state.entry_mut(session_id)?;

        let now = Utc::now();
        let stored = ChatMessage {
            id: Uuid::new_v4().to_string(),
            role: message.role,
            content: message.content,
            timestamp: now,
            case_id: message.case_id,
        };

        entry.session.messages.push(stored.clone());
        touch(&mut entry.session, now);

        Ok(stored)
    }

    /// Replaces the content of an existing message.
    ///
    /// This is the only way stored message content changes after append;
    /// streamed answers are written through it as they grow.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if either the session or the message is unknown.
    pub fn update_message_content(
        &self,
        session_id: &str,
        message_id: &str,
        content: impl Into<String>,
    ) -> Result<ChatMessage> {
        let mut state = self.write();
        let entry = state.entry_mut(session_id)?;

        let message = entry
            .session
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| RegdeskError::not_found("message", message_id))?;
        message.content = content.into();
        let updated = message.clone();

        touch(&mut entry.session, Utc::now());
        Ok(updated)
    }

    /// Drops every message of a session, keeping the session itself.
    pub fn clear_session(&self, session_id: &str) -> Result<()> {
        let mut state = self.write();
        let entry = state.entry_mut(session_id)?;
        entry.session.messages.clear();
        touch(&mut entry.session, Utc::now());

        tracing::debug!(session_id, "Cleared chat session");
        Ok(())
    }

    /// Current turn state of a session.
    pub fn turn_state(&self, session_id: &str) -> Option<TurnState> {
        self.read().entry(session_id).map(|e| e.turn)
    }

    /// Claims the session for a new chat turn.
    ///
    /// The check and the state change happen under one write lock, so two
    /// concurrent callers cannot both succeed. The returned guard puts the
    /// session back to [`TurnState::Idle`] when dropped.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `SessionBusy` if another turn is still running
    pub fn begin_turn(&self, session_id: &str) -> Result<TurnGuard> {
        let mut state = self.write();
        let entry = state.entry_mut(session_id)?;

        if entry.turn != TurnState::Idle {
            return Err(RegdeskError::SessionBusy {
                session_id: session_id.to_string(),
            });
        }
        entry.turn = TurnState::Sending;

        Ok(TurnGuard {
            store: self.clone(),
            session_id: session_id.to_string(),
        })
    }

    fn set_turn_state(&self, session_id: &str, turn: TurnState) {
        let mut state = self.write();
        if let Ok(entry) = state.entry_mut(session_id) {
            entry.turn = turn;
        }
    }
}

fn touch(session: &mut ChatSession, now: chrono::DateTime<Utc>) {
    // Wall clocks can step backwards; updated_at must not.
    session.updated_at = now.max(session.updated_at);
}

/// Exclusive claim on a session's chat turn. Releases on drop.
pub struct TurnGuard {
    store: SessionStore,
    session_id: String,
}

impl TurnGuard {
    /// Records that the provider has started streaming.
    pub fn mark_streaming(&self) {
        self.store.set_turn_state(&self.session_id, TurnState::Streaming);
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        self.store.set_turn_state(&self.session_id, TurnState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::InMemoryCaseRegistry;
    use crate::case::testing::sample_case;
    use crate::chat::MessageRole;
    use std::collections::HashSet;

    fn registry() -> InMemoryCaseRegistry {
        InMemoryCaseRegistry::new(vec![sample_case("case-001", 78), sample_case("case-002", 45)])
    }

    #[test]
    fn create_session_starts_empty_with_case_name() {
        let store = SessionStore::new();
        let session = store.create_session(&registry(), "case-001");

        assert!(session.messages.is_empty());
        assert_eq!(session.case_id, "case-001");
        assert_eq!(session.case_name, "CASE-001-NAME");
        assert_eq!(session.created_at, session.updated_at);
    }

    #[test]
    fn create_session_for_unknown_case_uses_placeholder() {
        let store = SessionStore::new();
        let session = store.create_session(&registry(), "case-404");
        assert_eq!(session.case_name, UNKNOWN_CASE_NAME);
    }

    #[test]
    fn session_ids_are_unique() {
        let store = SessionStore::new();
        let cases = registry();
        let ids: HashSet<_> = (0..200)
            .map(|_| store.create_session(&cases, "case-001").id)
            .collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn get_session_returns_none_for_unknown_id() {
        let store = SessionStore::new();
        store.create_session(&registry(), "case-001");
        assert!(store.get_session("never-issued").is_none());
    }

    #[test]
    fn append_to_missing_session_fails_without_mutation() {
        let store = SessionStore::new();
        let session = store.create_session(&registry(), "case-001");
        store
            .append_message(&session.id, NewMessage::user("hello", None))
            .unwrap();
        let before = store.list_sessions();

        let err = store
            .append_message("missing", NewMessage::user("lost", None))
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.list_sessions(), before);
    }

    #[test]
    fn append_preserves_order_and_bumps_updated_at() {
        let store = SessionStore::new();
        let session = store.create_session(&registry(), "case-001");

        let a = store
            .append_message(&session.id, NewMessage::user("A", Some("case-001".into())))
            .unwrap();
        let after_a = store.get_session(&session.id).unwrap().updated_at;
        let b = store
            .append_message(&session.id, NewMessage::assistant("B", Some("case-001".into())))
            .unwrap();
        let after_b = store.get_session(&session.id).unwrap();

        let tail: Vec<_> = after_b.messages.iter().rev().take(2).rev().cloned().collect();
        assert_eq!(tail, vec![a.clone(), b.clone()]);
        assert!(after_b.updated_at >= after_a);
        assert_ne!(a.id, b.id);
        assert_eq!(b.role, MessageRole::Assistant);
    }

    #[test]
    fn sessions_for_case_keeps_creation_order() {
        let store = SessionStore::new();
        let cases = registry();
        let first = store.create_session(&cases, "case-001");
        let other = store.create_session(&cases, "case-002");
        let second = store.create_session(&cases, "case-001");
        let _unknown = store.create_session(&cases, "case-404");
        let third = store.create_session(&cases, "case-001");

        let ids: Vec<_> = store
            .sessions_for_case("case-001")
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);

        let others: Vec<_> = store
            .sessions_for_case("case-002")
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(others, vec![other.id]);
        assert!(store.sessions_for_case("case-003").is_empty());
    }

    #[test]
    fn update_message_content_replaces_text() {
        let store = SessionStore::new();
        let session = store.create_session(&registry(), "case-001");
        let placeholder = store
            .append_message(&session.id, NewMessage::assistant("", None))
            .unwrap();

        let updated = store
            .update_message_content(&session.id, &placeholder.id, "partial answer")
            .unwrap();

        assert_eq!(updated.id, placeholder.id);
        assert_eq!(updated.content, "partial answer");
        let stored = store.get_session(&session.id).unwrap();
        assert_eq!(stored.message(&placeholder.id).unwrap().content, "partial answer");
    }

    #[test]
    fn update_message_content_reports_missing_targets() {
        let store = SessionStore::new();
        let session = store.create_session(&registry(), "case-001");

        let missing_session = store.update_message_content("nope", "m", "x").unwrap_err();
        let missing_message = store.update_message_content(&session.id, "m", "x").unwrap_err();

        assert_eq!(missing_session, RegdeskError::not_found("session", "nope"));
        assert_eq!(missing_message, RegdeskError::not_found("message", "m"));
    }

    #[test]
    fn clear_session_truncates_messages_but_keeps_session() {
        let store = SessionStore::new();
        let session = store.create_session(&registry(), "case-001");
        store
            .append_message(&session.id, NewMessage::user("hello", None))
            .unwrap();

        store.clear_session(&session.id).unwrap();

        let cleared = store.get_session(&session.id).unwrap();
        assert!(cleared.messages.is_empty());
        assert_eq!(store.sessions_for_case("case-001").len(), 1);
        assert!(store.clear_session("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn second_turn_is_rejected_while_first_is_running() {
        let store = SessionStore::new();
        let session = store.create_session(&registry(), "case-001");

        let guard = store.begin_turn(&session.id).unwrap();
        assert_eq!(store.turn_state(&session.id), Some(TurnState::Sending));
        guard.mark_streaming();
        assert_eq!(store.turn_state(&session.id), Some(TurnState::Streaming));

        let err = store.begin_turn(&session.id).err().unwrap();
        assert!(err.is_busy());

        drop(guard);
        assert_eq!(store.turn_state(&session.id), Some(TurnState::Idle));
        assert!(store.begin_turn(&session.id).is_ok());
    }

    #[test]
    fn turns_on_different_sessions_are_independent() {
        let store = SessionStore::new();
        let cases = registry();
        let a = store.create_session(&cases, "case-001");
        let b = store.create_session(&cases, "case-001");

        let _guard_a = store.begin_turn(&a.id).unwrap();
        assert!(store.begin_turn(&b.id).is_ok());
        assert!(store.begin_turn("missing").err().unwrap().is_not_found());
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        let store = SessionStore::new();
        let session = store.create_session(&registry(), "case-001");

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                let id = session.id.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store
                            .append_message(&id, NewMessage::user(format!("{t}-{i}"), None))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = store.get_session(&session.id).unwrap();
        assert_eq!(stored.messages.len(), 200);
        let ids: HashSet<_> = stored.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 200);
    }
}
