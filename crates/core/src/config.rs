use std::{
    fs::{self, File},
    io::Write,
    path::PathBuf,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::{
    assets::{get_config_dir, get_default_config},
    mode::Mode,
};

pub const DEFAULT_PROVIDER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_API_KEY: &str = "env:OPENROUTER_API_KEY";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000/api/ai";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File system error: {0}")]
    IO(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    YAMLError(#[from] serde_yaml::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// How the persona preamble is delivered to the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptLayout {
    /// A `system` message followed by the `user` message.
    #[default]
    SystemAndUser,
    /// One `user` message with the preamble inlined.
    SingleUser,
}

/// Relay settings as written in the config file. The api key may still be an
/// `env:NAME` reference.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RelaySettings {
    pub provider_url: String,
    pub model: String,
    pub api_key: String,
    pub prompt_layout: PromptLayout,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            prompt_layout: PromptLayout::default(),
        }
    }
}

impl RelaySettings {
    /// Resolves the credential and returns the configuration the relay runs with.
    #[instrument(skip(self))]
    pub fn resolve(&self) -> Result<RelayConfig, ConfigError> {
        let api_key = match self.api_key.strip_prefix("env:") {
            Some(env_key) => {
                let env_key = env_key.trim();
                std::env::var(env_key).map_err(|_| {
                    ConfigError::Config(format!("Environment variable {env_key} not found"))
                })?
            }
            None => self.api_key.clone(),
        };

        if api_key.trim().is_empty() {
            return Err(ConfigError::Config(
                "'api_key' setting is required for the relay".to_string(),
            ));
        }

        Ok(RelayConfig {
            provider_url: self.provider_url.clone(),
            model: self.model.clone(),
            api_key,
            prompt_layout: self.prompt_layout,
        })
    }
}

/// Resolved relay configuration, passed explicitly into the relay service.
#[derive(Clone, PartialEq)]
pub struct RelayConfig {
    pub provider_url: String,
    pub model: String,
    pub api_key: String,
    pub prompt_layout: PromptLayout,
}

impl RelayConfig {
    pub fn new(provider_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider_url: provider_url.into(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            prompt_layout: PromptLayout::default(),
        }
    }
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("provider_url", &self.provider_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("prompt_layout", &self.prompt_layout)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub relay_url: String,
    pub mode: Option<Mode>,
    pub memory: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            mode: Some(Mode::Summarize),
            memory: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub relay: RelaySettings,
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[instrument(skip(config_path))]
pub fn create_or_get_config_file(
    config_path: Option<PathBuf>,
) -> Result<(bool, PathBuf), ConfigError> {
    let actual_path = config_path.unwrap_or_else(|| get_config_dir().join("dragon.yml"));

    let parent_dir = actual_path.parent().ok_or_else(|| {
        ConfigError::IO(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Config path has no parent directory",
        ))
    })?;

    if !parent_dir.exists() {
        fs::create_dir_all(parent_dir)?;
    }

    if actual_path.exists() {
        Ok((true, actual_path))
    } else {
        File::create(&actual_path)?.write_all(get_default_config().as_bytes())?;
        Ok((false, actual_path))
    }
}

#[instrument(skip(config_path))]
pub fn get_config(config_path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let (_, config_file) = create_or_get_config_file(config_path)?;
    let content = fs::read_to_string(&config_file)?;
    let config: Option<Config> = serde_yaml::from_str(&content)?;
    Ok(config.unwrap_or_default())
}
