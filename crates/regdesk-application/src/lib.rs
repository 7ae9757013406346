//! Application layer for regdesk.
//!
//! Coordinates the case registry, the session store and a completion
//! client into chat turns.

pub mod chat_usecase;

pub use chat_usecase::{
    ChatUseCase, RESPONSE_CANCELLED_TEXT, RESPONSE_FAILED_TEXT, SESSION_BUSY_TEXT,
    user_facing_error,
};
