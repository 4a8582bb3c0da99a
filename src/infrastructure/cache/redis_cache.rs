//! Redis conversation cache: one list per conversation, newest at the tail.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::domain::error::BotError;
use crate::domain::traits::{ConversationCache, Exchange};

const KEY_PREFIX: &str = "marsbot:conversation:";

pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(uri: &str) -> Result<Self, BotError> {
        let client = redis::Client::open(uri)
            .map_err(|e| BotError::config(format!("invalid REDIS_URI: {e}")))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| BotError::Store(format!("failed to connect to Redis: {e}")))?;
        Ok(Self { conn })
    }

    fn key(conversation: &str) -> String {
        format!("{KEY_PREFIX}{conversation}")
    }
}

/// LTRIM bounds keeping the newest `limit` entries; `None` when nothing is kept.
fn trim_range(limit: usize) -> Option<(isize, isize)> {
    let keep = isize::try_from(limit).unwrap_or(isize::MAX);
    (keep > 0).then_some((-keep, -1))
}

#[async_trait]
impl ConversationCache for RedisCache {
    async fn history(&self, conversation: &str) -> Result<Vec<Exchange>, BotError> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn
            .lrange(Self::key(conversation), 0, -1)
            .await
            .map_err(|e| BotError::Store(e.to_string()))?;

        // Entries that fail to decode are skipped rather than poisoning the conversation.
        Ok(raw
            .iter()
            .filter_map(|entry| serde_json::from_str(entry).ok())
            .collect())
    }

    async fn record(
        &self,
        conversation: &str,
        exchange: Exchange,
        limit: usize,
    ) -> Result<(), BotError> {
        let Some((start, stop)) = trim_range(limit) else {
            return Ok(());
        };
        let key = Self::key(conversation);
        let entry = serde_json::to_string(&exchange).map_err(|e| BotError::Store(e.to_string()))?;

        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .rpush(&key, entry)
            .ignore()
            .ltrim(&key, start, stop)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| BotError::Store(e.to_string()))?;
        Ok(())
    }
}
