//! # LLM Client
//!
//! Provides the `Client` struct, the `LlmProvider` implementation the character
//! service talks to.

use async_trait::async_trait;
use std::time::Duration;

use super::openai;
use super::{Context, Error};
use crate::domain::config::LlmConfig;
use crate::domain::error::BotError;
use crate::domain::traits::LlmProvider;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for a provider
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key
    pub api_key: String,
    /// Base URL, without the `/chat/completions` suffix
    pub base_url: String,
    /// Default model
    pub default_model: String,
    /// Timeout in seconds
    pub timeout: u64,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ProviderConfig {
    pub fn from_llm_config(config: &LlmConfig, api_key: String) -> Self {
        Self {
            api_key,
            base_url: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            default_model: config.model.clone(),
            timeout: config.timeout,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Simple LLM client
pub struct Client {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl Client {
    pub fn new(config: ProviderConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| Error::new("openai", format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.default_model
    }
}

#[async_trait]
impl LlmProvider for Client {
    async fn complete(&self, context: Context) -> Result<String, BotError> {
        let response = openai::chat(&self.http, &self.config, context)
            .await
            .map_err(|e| BotError::Llm(e.to_string()))?;
        tracing::debug!(
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            "completion received"
        );
        Ok(response.content)
    }
}
