//! Completion provider clients.

pub mod openai_client;
pub mod sse;

pub use openai_client::OpenAICompletionClient;
