//! # Configuration
//!
//! Non-secret settings come from the optional `data/config.yaml`; secrets come
//! from the environment (a `.env` file is loaded first when present).

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::domain::error::BotError;

pub const DISCORD_TOKEN_ENV: &str = "DISCORD_TOKEN";
pub const MONGODB_URI_ENV: &str = "MONGODB_URI";
pub const REDIS_URI_ENV: &str = "REDIS_URI";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`; every section is optional.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub personality: PersonalityConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub character: CharacterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(skip)]
    pub secrets: Secrets,
}

/// Where personalities are loaded from. One source per deployment.
#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PersonalitySource {
    #[default]
    Store,
    Manifest,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersonalityConfig {
    #[serde(default)]
    pub source: PersonalitySource,
    /// Root of `<bots_dir>/<id>/manifest.yaml` files.
    #[serde(default = "default_bots_dir")]
    pub bots_dir: String,
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            source: PersonalitySource::default(),
            bots_dir: default_bots_dir(),
            database: default_database(),
        }
    }
}

fn default_bots_dir() -> String {
    "bots".to_string()
}

fn default_database() -> String {
    "marsbots".to_string()
}

/// OpenAI-compatible completion settings for the character service.
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: None,
            temperature: None,
            max_tokens: None,
            timeout: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct CharacterConfig {
    /// Exchanges remembered per conversation.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file: default_log_file(),
        }
    }
}

fn default_log_dir() -> String {
    "data".to_string()
}

fn default_log_file() -> String {
    "session.log".to_string()
}

/// Secrets read from the process environment.
#[derive(Clone, Default)]
pub struct Secrets {
    pub discord_token: Option<String>,
    pub mongodb_uri: Option<String>,
    pub redis_uri: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            discord_token: get(DISCORD_TOKEN_ENV),
            mongodb_uri: get(MONGODB_URI_ENV),
            redis_uri: get(REDIS_URI_ENV),
            openai_api_key: get(OPENAI_API_KEY_ENV),
        }
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |value: &Option<String>| if value.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("discord_token", &mask(&self.discord_token))
            .field("mongodb_uri", &mask(&self.mongodb_uri))
            .field("redis_uri", &mask(&self.redis_uri))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .finish()
    }
}

impl AppConfig {
    /// Read the config file if it exists, then attach secrets from the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BotError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                BotError::config(format!("failed to read {}: {e}", path.display()))
            })?;
            Self::from_yaml(&content)?
        } else {
            Self::default()
        };
        config.secrets = Secrets::from_env();
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, BotError> {
        // An empty file parses as `null`.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| BotError::config(format!("failed to parse config: {e}")))
    }

    /// Fail on any secret this deployment cannot start without.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.secrets.discord_token.is_none() {
            return Err(BotError::config(format!("{DISCORD_TOKEN_ENV} is not set")));
        }
        if self.personality.source == PersonalitySource::Store && self.secrets.mongodb_uri.is_none()
        {
            return Err(BotError::config(format!(
                "{MONGODB_URI_ENV} is required when personality.source is `store`"
            )));
        }
        Ok(())
    }
}
