//! World settings operations.

use std::sync::Arc;

use heroledger_domain::{DomainError, WorldId, WorldSettings};

use crate::infrastructure::ports::{RepoError, SettingsRepo};

/// Errors from settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Settings get/update use cases.
pub struct SettingsOps {
    repo: Arc<dyn SettingsRepo>,
}

impl SettingsOps {
    pub fn new(repo: Arc<dyn SettingsRepo>) -> Self {
        Self { repo }
    }

    /// Current settings for a world, falling back to defaults.
    pub async fn get(&self, world_id: WorldId) -> Result<WorldSettings, SettingsError> {
        Ok(self.repo.get(world_id).await?.unwrap_or_default())
    }

    /// Validate and persist new settings.
    pub async fn update(
        &self,
        world_id: WorldId,
        settings: WorldSettings,
    ) -> Result<WorldSettings, SettingsError> {
        settings.validate()?;
        self.repo.save(world_id, &settings).await?;
        tracing::info!(%world_id, "World settings updated");
        Ok(settings)
    }
}
