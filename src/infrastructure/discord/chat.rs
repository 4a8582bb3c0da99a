//! [`DiscordChat`] -- `ChatProvider` over the Discord REST API.

use async_trait::async_trait;
use std::sync::Arc;

use super::api::DiscordApiClient;
use crate::domain::error::BotError;
use crate::domain::message::InboundMessage;
use crate::domain::traits::ChatProvider;

/// Discord allows up to 2000 characters per message.
const DISCORD_MAX_MESSAGE_LEN: usize = 2000;

/// Split a message into chunks that fit within the Discord character limit.
///
/// Prefers line boundaries, then word boundaries, then hard-splits on a
/// character boundary.
fn chunk_message(content: &str, max_len: usize) -> Vec<&str> {
    if content.len() <= max_len {
        return vec![content];
    }

    let mut chunks = Vec::new();
    let mut remaining = content;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining);
            break;
        }

        let mut limit = max_len;
        while !remaining.is_char_boundary(limit) {
            limit -= 1;
        }
        let search_range = &remaining[..limit];

        let split_at = search_range
            .rfind('\n')
            .or_else(|| search_range.rfind(' '))
            .map(|pos| pos + 1)
            .unwrap_or(limit);

        let (chunk, rest) = remaining.split_at(split_at);
        let chunk = chunk.trim_end();
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        remaining = rest.trim_start_matches('\n');
    }

    if chunks.is_empty() {
        chunks.push(content);
    }

    chunks
}

#[derive(Clone)]
pub struct DiscordChat {
    api: Arc<DiscordApiClient>,
}

impl DiscordChat {
    pub fn new(api: Arc<DiscordApiClient>) -> Self {
        Self { api }
    }

    async fn deliver(
        &self,
        channel_id: &str,
        content: &str,
        reply_to: &str,
    ) -> Result<String, BotError> {
        let mut last_id = String::new();
        // Only the first chunk carries the reply reference.
        for (index, chunk) in chunk_message(content, DISCORD_MAX_MESSAGE_LEN).iter().enumerate() {
            let reference = (index == 0).then_some(reply_to);
            last_id = self.api.create_message(channel_id, chunk, reference).await?;
        }
        Ok(last_id)
    }
}

#[async_trait]
impl ChatProvider for DiscordChat {
    async fn reply(&self, message: &InboundMessage, content: &str) -> Result<String, BotError> {
        tracing::info!(channel_id = %message.channel_id, message_id = %message.id, "bot replying");
        self.deliver(&message.channel_id, content, &message.id)
            .await
    }

    async fn typing(&self, channel_id: &str) -> Result<(), BotError> {
        self.api.trigger_typing(channel_id).await
    }
}
