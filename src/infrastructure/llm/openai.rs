//! OpenAI-compatible API provider

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::client::ProviderConfig;
use super::{Context, Error, Response, TokenUsage};

const PROVIDER: &str = "openai";

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

fn build_request(config: &ProviderConfig, context: Context) -> OpenAIRequest {
    OpenAIRequest {
        model: context
            .model
            .unwrap_or_else(|| config.default_model.clone()),
        messages: context
            .messages
            .into_iter()
            .map(|msg| OpenAIMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content,
            })
            .collect(),
        temperature: context.temperature.or(config.temperature),
        max_tokens: context.max_tokens.or(config.max_tokens),
    }
}

/// Pull the provider's own message out of an error body when it has one.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body))
}

fn into_response(parsed: OpenAIResponse) -> Result<Response, Error> {
    let usage = parsed
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    let content = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::new(PROVIDER, "No choices in response"))?
        .message
        .content
        .unwrap_or_default();

    Ok(Response {
        content,
        model: parsed.model,
        usage,
    })
}

/// Execute a chat request using an OpenAI-compatible API
pub async fn chat(http: &Client, config: &ProviderConfig, context: Context) -> Result<Response, Error> {
    let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
    let request = build_request(config, context);

    let response = http
        .post(&url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await
        .map_err(|e| Error::new(PROVIDER, format!("HTTP request failed: {}", e)))?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(Error::new(PROVIDER, error_message(status, &error_text)));
    }

    let parsed: OpenAIResponse = response
        .json()
        .await
        .map_err(|e| Error::new(PROVIDER, format!("Failed to parse response: {}", e)))?;

    into_response(parsed)
}
