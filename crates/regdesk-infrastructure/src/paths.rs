//! Unified path management for regdesk configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/regdesk/           # Config directory
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API keys
//! ├── history                  # REPL input history
//! └── logs/                    # Application logs
//!     └── regdesk.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "regdesk";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for regdesk.
pub struct RegdeskPaths;

impl RegdeskPaths {
    /// Returns the regdesk configuration directory (e.g. `~/.config/regdesk/`).
    ///
    /// Uses `~/.config` on every platform, falling back to the platform
    /// config directory when no home directory is known.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::home_dir()
            .map(|home| home.join(".config"))
            .or_else(dirs::config_dir)
            .map(|base| base.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secret configuration file.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Returns the path to the REPL history file.
    pub fn history_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("history"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let config_dir = RegdeskPaths::config_dir().unwrap();
        assert!(config_dir.ends_with("regdesk"));
    }

    #[test]
    fn test_files_live_in_config_dir() {
        let config_dir = RegdeskPaths::config_dir().unwrap();
        for file in [
            RegdeskPaths::config_file().unwrap(),
            RegdeskPaths::secret_file().unwrap(),
            RegdeskPaths::history_file().unwrap(),
        ] {
            assert!(file.starts_with(&config_dir));
        }
        assert!(RegdeskPaths::secret_file().unwrap().ends_with("secret.json"));
    }

    #[test]
    fn test_logs_dir() {
        let logs_dir = RegdeskPaths::logs_dir().unwrap();
        assert!(logs_dir.ends_with("logs"));
        assert!(logs_dir.starts_with(RegdeskPaths::config_dir().unwrap()));
    }
}
