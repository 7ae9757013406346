//! Configuration service implementation.
//!
//! Loads the root configuration from `~/.config/regdesk/config.toml`.

use crate::paths::RegdeskPaths;
use regdesk_core::config::RootConfig;
use regdesk_core::{RegdeskError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the root configuration.
///
/// A missing file is not an error: every setting has a default.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService for the default config file.
    pub fn new() -> Result<Self> {
        let path = RegdeskPaths::config_file().map_err(|e| RegdeskError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a ConfigService for a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn get_config(&self) -> Result<RootConfig> {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = load_config(&self.path)?;

        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(loaded.clone());
        Ok(loaded)
    }
}

fn load_config(path: &Path) -> Result<RootConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(RootConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: RootConfig = toml::from_str(&content)?;
    tracing::debug!(path = %path.display(), "Loaded config");
    Ok(config)
}
