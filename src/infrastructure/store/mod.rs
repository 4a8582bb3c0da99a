//! # Personality Stores
//!
//! Resolve a bot identifier to its `PersonalityRecord`, either from a manifest
//! file on disk or from the MongoDB `personalities` collection.

mod manifest;
mod mongo;

pub use manifest::{ManifestStore, parse_manifest};
pub use mongo::{MongoStore, project};

use std::sync::Arc;

use crate::domain::config::{AppConfig, PersonalitySource};
use crate::domain::error::BotError;
use crate::domain::traits::PersonalityStore;

/// Identifiers double as directory names and document keys, so keep them tame.
pub fn validate_identifier(id: &str) -> Result<(), BotError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(BotError::InvalidIdentifier(id.to_string()))
    }
}

/// Open the store this deployment is configured for.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn PersonalityStore>, BotError> {
    match config.personality.source {
        PersonalitySource::Manifest => {
            tracing::info!(dir = %config.personality.bots_dir, "loading personalities from manifests");
            Ok(Arc::new(ManifestStore::new(&config.personality.bots_dir)))
        }
        PersonalitySource::Store => {
            let uri = config.secrets.mongodb_uri.as_deref().ok_or_else(|| {
                BotError::config("MONGODB_URI is required for the document store")
            })?;
            tracing::info!(database = %config.personality.database, "loading personalities from MongoDB");
            Ok(Arc::new(
                MongoStore::connect(uri, &config.personality.database).await?,
            ))
        }
    }
}
