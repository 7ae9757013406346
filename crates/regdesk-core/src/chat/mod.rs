//! Chat session domain module.
//!
//! # Module Structure
//!
//! - `message`: message types (`MessageRole`, `ChatMessage`, `NewMessage`)
//! - `model`: the `ChatSession` entity
//! - `store`: the in-memory `SessionStore` and per-session turn guard

mod message;
mod model;
mod store;

pub use message::{ChatMessage, MessageRole, NewMessage};
pub use model::{ChatSession, UNKNOWN_CASE_NAME};
pub use store::{SessionStore, TurnGuard, TurnState};
