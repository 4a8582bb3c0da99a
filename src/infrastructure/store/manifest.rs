//! Manifest-file personality store: `<root>/<id>/manifest.yaml`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::validate_identifier;
use crate::domain::error::BotError;
use crate::domain::personality::PersonalityRecord;
use crate::domain::traits::PersonalityStore;

const MANIFEST_NAMES: [&str; 2] = ["manifest.yaml", "manifest.yml"];

pub struct ManifestStore {
    root: PathBuf,
}

impl ManifestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, id: &str) -> Option<PathBuf> {
        let dir = self.root.join(id);
        MANIFEST_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }
}

/// Parse a manifest document. Missing required keys are configuration errors.
pub fn parse_manifest(content: &str, origin: &Path) -> Result<PersonalityRecord, BotError> {
    serde_yaml::from_str(content)
        .map_err(|e| BotError::config(format!("invalid manifest {}: {e}", origin.display())))
}

#[async_trait]
impl PersonalityStore for ManifestStore {
    async fn load(&self, id: &str) -> Result<PersonalityRecord, BotError> {
        validate_identifier(id)?;
        let path = self.locate(id).ok_or_else(|| {
            BotError::NotFound(format!(
                "no manifest for `{id}` under {}",
                self.root.display()
            ))
        })?;

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| BotError::config(format!("failed to read {}: {e}", path.display())))?;
        let record = parse_manifest(&content, &path)?;

        if record.id != id {
            tracing::warn!(
                requested = %id,
                manifest_id = %record.id,
                "manifest id differs from its directory name"
            );
        }
        Ok(record)
    }
}
