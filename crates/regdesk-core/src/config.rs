use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Root of `config.toml`. Every field has a default, so an empty or
/// missing file is valid.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct RootConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub fixtures: FixtureConfig,
}

/// Completion provider settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound for a whole request. Unset means no timeout.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ProviderConfig {
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

/// Case fixture loading settings.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct FixtureConfig {
    /// Cases file to load instead of the built-in fixtures.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Refuse to start when fixtures break summary invariants.
    #[serde(default)]
    pub strict: bool,
}

/// Parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub openai: Option<OpenAISecret>,
}

/// OpenAI API credentials
#[derive(Clone, Deserialize)]
pub struct OpenAISecret {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

impl std::fmt::Debug for OpenAISecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAISecret")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .finish()
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: RootConfig = toml::from_str("").unwrap();
        assert_eq!(config, RootConfig::default());
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.provider.max_tokens, 1000);
        assert!(config.provider.request_timeout().is_none());
        assert!(!config.fixtures.strict);
    }

    #[test]
    fn partial_provider_section_keeps_other_defaults() {
        let config: RootConfig = toml::from_str(
            r#"
            [provider]
            model = "gpt-4o-mini"
            request_timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.provider.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn secret_debug_hides_api_key() {
        let secret = OpenAISecret {
            api_key: "sk-live-123".to_string(),
            model_name: None,
        };
        assert!(!format!("{secret:?}").contains("sk-live-123"));
    }
}
