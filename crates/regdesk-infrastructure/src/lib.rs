//! Infrastructure for regdesk: file locations, configuration, secrets and
//! case fixtures.

pub mod config_service;
pub mod paths;
pub mod storage;
pub mod toml_case_loader;

pub use crate::config_service::ConfigService;
pub use crate::paths::RegdeskPaths;
pub use crate::storage::SecretStorage;
pub use crate::toml_case_loader::TomlCaseLoader;
