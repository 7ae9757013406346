//! Domain layer for regdesk: regulatory cases, chat sessions, prompt
//! construction and the completion provider interface.

pub mod case;
pub mod chat;
pub mod completion;
pub mod config;
pub mod error;
pub mod prompt;

// Re-export common error type
pub use error::{RegdeskError, Result};
