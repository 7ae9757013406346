//! File-backed storage helpers.

pub mod secret_storage;

pub use secret_storage::{SecretStorage, SecretStorageError};
