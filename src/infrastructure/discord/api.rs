//! Discord REST API client.
//!
//! Typed methods for the subset of the REST API the bot uses: creating
//! messages (optionally as replies) and triggering the typing indicator.

use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};

use super::events::RateLimitInfo;
use crate::domain::error::BotError;

/// Base URL for the Discord REST API v10.
const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Response from creating a message.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DiscordMessage {
    pub id: String,
}

/// HTTP client for the Discord REST API, authenticated with a bot token.
pub struct DiscordApiClient {
    http: Client,
    token: String,
}

impl DiscordApiClient {
    pub fn new(token: String) -> Self {
        Self {
            http: Client::new(),
            token,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bot {}", self.token))
            .header("Content-Type", "application/json")
    }

    /// Honour rate limit headers, then turn non-2xx statuses into errors.
    async fn checked(resp: Response) -> Result<Response, BotError> {
        let rate_limit = RateLimitInfo::from_headers(resp.headers());
        if rate_limit.is_limited() {
            let wait_ms = rate_limit.retry_after_ms().unwrap_or(1000);
            warn!(wait_ms, "Discord rate limit reached, waiting");
            tokio::time::sleep(std::time::Duration::from_millis(wait_ms)).await;
        }

        let status = resp.status();
        if !status.is_success() {
            let err_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".into());
            return Err(BotError::Transport(format!(
                "Discord API returned {status}: {err_body}"
            )));
        }
        Ok(resp)
    }

    /// Send a message to a channel, as a reply when `reply_to` is set.
    ///
    /// Returns the message ID on success.
    pub async fn create_message(
        &self,
        channel_id: &str,
        content: &str,
        reply_to: Option<&str>,
    ) -> Result<String, BotError> {
        let url = channel_url(channel_id, "messages");
        let body = message_body(content, reply_to);

        debug!(channel_id = %channel_id, reply = reply_to.is_some(), "creating message");

        let resp = self
            .authorized(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        let msg: DiscordMessage = Self::checked(resp)
            .await?
            .json()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        Ok(msg.id)
    }

    /// Show the typing indicator for roughly ten seconds.
    pub async fn trigger_typing(&self, channel_id: &str) -> Result<(), BotError> {
        let url = channel_url(channel_id, "typing");
        let resp = self
            .authorized(self.http.post(&url))
            .send()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Self::checked(resp).await.map(|_| ())
    }
}

fn channel_url(channel_id: &str, resource: &str) -> String {
    format!("{DISCORD_API_BASE}/channels/{channel_id}/{resource}")
}

fn message_body(content: &str, reply_to: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({ "content": content });
    if let Some(message_id) = reply_to {
        body["message_reference"] = serde_json::json!({
            "message_id": message_id,
            "fail_if_not_exists": false,
        });
    }
    body
}
