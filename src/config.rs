//! Configuration loading: provider credentials, model override, timeout.
//!
//! Settings come from `~/.shellpilot/config.toml` when present, with
//! environment variables taking precedence. When keys for several providers
//! are set, a fixed priority order (Anthropic, then OpenAI) selects the
//! active one.

use crate::error::{PilotError, Result};
use dirs::home_dir;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Default bound on subprocess execution, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// Overrides the active provider's default model id.
    #[serde(default)]
    pub model: Option<String>,
    /// Execution timeout in seconds.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Use the deterministic mock provider instead of a live backend.
    #[serde(default)]
    pub use_mock: bool,
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Environment variables override the config file. Never fails outright:
    /// a missing file just yields defaults, and credential absence is only
    /// an error once a provider is actually selected.
    pub fn load() -> Self {
        let mut config = Self::load_from_file().unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });

        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.is_empty() {
                config.anthropic_api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.openai_api_key = Some(key);
            }
        }
        if std::env::var("SHELLPILOT_USE_MOCK").is_ok() {
            config.use_mock = true;
        }

        config
    }

    fn load_from_file() -> Option<Self> {
        let config_path = Self::config_path()?;
        let content = fs::read_to_string(&config_path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => {
                info!("Loaded config from: {}", config_path.display());
                Some(config)
            }
            Err(err) => {
                tracing::warn!("Ignoring unparseable config {}: {}", config_path.display(), err);
                None
            }
        }
    }

    fn config_path() -> Option<PathBuf> {
        Some(home_dir()?.join(".shellpilot").join("config.toml"))
    }

    /// The credential for the active provider, by fixed priority.
    pub fn active_credential(&self) -> Result<ProviderCredential> {
        if self.use_mock {
            return Ok(ProviderCredential::Mock);
        }
        if let Some(key) = &self.anthropic_api_key {
            return Ok(ProviderCredential::Anthropic(key.clone()));
        }
        if let Some(key) = &self.openai_api_key {
            return Ok(ProviderCredential::OpenAi(key.clone()));
        }
        Err(PilotError::Config(
            "no provider credential found; set ANTHROPIC_API_KEY or OPENAI_API_KEY \
             (or add it to ~/.shellpilot/config.toml)"
                .to_string(),
        ))
    }

    /// Execution timeout, config override or default.
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

/// The selected provider credential, in priority order.
#[derive(Debug, Clone)]
pub enum ProviderCredential {
    Anthropic(String),
    OpenAi(String),
    Mock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anthropic_key_wins_over_openai() {
        let config = Config {
            anthropic_api_key: Some("sk-ant-test".to_string()),
            openai_api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            config.active_credential().unwrap(),
            ProviderCredential::Anthropic(_)
        ));
    }

    #[test]
    fn openai_key_used_when_anthropic_absent() {
        let config = Config {
            openai_api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            config.active_credential().unwrap(),
            ProviderCredential::OpenAi(_)
        ));
    }

    #[test]
    fn mock_mode_overrides_credentials() {
        let config = Config {
            anthropic_api_key: Some("sk-ant-test".to_string()),
            use_mock: true,
            ..Config::default()
        };
        assert!(matches!(
            config.active_credential().unwrap(),
            ProviderCredential::Mock
        ));
    }

    #[test]
    fn no_credential_is_a_config_error() {
        let config = Config::default();
        assert!(matches!(
            config.active_credential(),
            Err(PilotError::Config(_))
        ));
    }

    #[test]
    fn timeout_defaults_when_unset() {
        let config = Config::default();
        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECS);

        let config = Config {
            timeout_seconds: Some(300),
            ..Config::default()
        };
        assert_eq!(config.timeout_seconds(), 300);
    }

    #[test]
    fn config_parses_from_toml() {
        let config: Config = toml::from_str(
            r#"
            anthropic_api_key = "sk-ant-abc"
            model = "claude-3-5-haiku-latest"
            timeout_seconds = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-ant-abc"));
        assert_eq!(config.model.as_deref(), Some("claude-3-5-haiku-latest"));
        assert_eq!(config.timeout_seconds(), 120);
        assert!(!config.use_mock);
    }
}
