//! # Domain Traits
//!
//! Abstract interfaces for the external collaborators (chat transport, personality
//! store, language model, conversation cache). Implementations live in the
//! Infrastructure layer; tests substitute recording fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::error::BotError;
use crate::domain::message::InboundMessage;
use crate::domain::personality::PersonalityRecord;
use crate::infrastructure::llm::Context;

/// Abstract interface for a Chat Provider (Discord, or a fake in tests)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Reply to a message in its channel, returning the new message ID
    async fn reply(&self, message: &InboundMessage, content: &str) -> Result<String, BotError>;

    /// Show the typing indicator in a channel
    async fn typing(&self, channel_id: &str) -> Result<(), BotError>;
}

/// Resolves a bot identifier to its personality record.
#[async_trait]
pub trait PersonalityStore: Send + Sync {
    async fn load(&self, id: &str) -> Result<PersonalityRecord, BotError>;
}

/// Abstract interface for an LLM Provider
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for the given conversation
    async fn complete(&self, context: Context) -> Result<String, BotError>;
}

/// One remembered round of a character conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub sender: String,
    pub message: String,
    pub reply: String,
}

/// Per-conversation history. Implementations must tolerate interleaved access
/// from concurrently dispatched messages.
#[async_trait]
pub trait ConversationCache: Send + Sync {
    /// Oldest first.
    async fn history(&self, conversation: &str) -> Result<Vec<Exchange>, BotError>;

    /// Append an exchange, keeping at most `limit` of the newest.
    async fn record(
        &self,
        conversation: &str,
        exchange: Exchange,
        limit: usize,
    ) -> Result<(), BotError>;
}
