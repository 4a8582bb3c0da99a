//! In-process conversation cache.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

use crate::domain::error::BotError;
use crate::domain::traits::{ConversationCache, Exchange};

#[derive(Default)]
pub struct MemoryCache {
    conversations: Mutex<HashMap<String, VecDeque<Exchange>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationCache for MemoryCache {
    async fn history(&self, conversation: &str) -> Result<Vec<Exchange>, BotError> {
        let guard = self.conversations.lock().await;
        Ok(guard
            .get(conversation)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn record(
        &self,
        conversation: &str,
        exchange: Exchange,
        limit: usize,
    ) -> Result<(), BotError> {
        if limit == 0 {
            return Ok(());
        }
        let mut guard = self.conversations.lock().await;
        let entries = guard.entry(conversation.to_string()).or_default();
        entries.push_back(exchange);
        while entries.len() > limit {
            entries.pop_front();
        }
        Ok(())
    }
}
