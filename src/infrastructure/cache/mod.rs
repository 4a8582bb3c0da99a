//! # Conversation Caches
//!
//! Backends for the character service's per-conversation history.

mod memory;
#[cfg(feature = "redis")]
mod redis_cache;

pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;

use std::sync::Arc;

use crate::domain::error::BotError;
use crate::domain::traits::ConversationCache;

/// Redis when a URI is configured and the `redis` feature is built in,
/// otherwise an in-process map.
pub async fn open_cache(redis_uri: Option<&str>) -> Result<Arc<dyn ConversationCache>, BotError> {
    match redis_uri {
        #[cfg(feature = "redis")]
        Some(uri) => {
            tracing::info!("using Redis conversation cache");
            Ok(Arc::new(RedisCache::connect(uri).await?))
        }
        #[cfg(not(feature = "redis"))]
        Some(_) => {
            tracing::warn!("REDIS_URI is set but marsbot was built without the `redis` feature; using in-memory cache");
            Ok(Arc::new(MemoryCache::new()))
        }
        None => Ok(Arc::new(MemoryCache::new())),
    }
}
