//! Unified repository loader
//!
//! Loads all repository content described by a [`RepositoryConfig`].

use crate::config::{RepositoryConfig, RepositorySource};
use crate::content::RepositoryContent;
use crate::error::{RepositoryError, RepositoryResult};
use crate::file_system::FileSystemRepository;
use crate::memory::MemoryRepository;
use crate::traits::Repository;

/// Unified repository loader
///
/// # Example
///
/// ```rust,ignore
/// use verdict_repository::{RepositoryConfig, RepositoryLoader};
///
/// let config = RepositoryConfig::file_system("policies");
/// let content = RepositoryLoader::new(config).load_all().await?;
/// ```
pub struct RepositoryLoader {
    config: RepositoryConfig,
}

impl RepositoryLoader {
    pub fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Load every module, template and policy definition
    pub async fn load_all(&self) -> RepositoryResult<RepositoryContent> {
        self.config
            .validate()
            .map_err(|e| RepositoryError::Config(e.to_string()))?;

        match self.config.source {
            RepositorySource::FileSystem => {
                let base_path = self.config.base_path.as_ref().ok_or_else(|| {
                    RepositoryError::Config("base_path required for FileSystem source".to_string())
                })?;
                let repo = FileSystemRepository::new(base_path)?;
                load_from(&repo).await
            }
            RepositorySource::Memory => load_from(&MemoryRepository::from_config(&self.config)).await,
        }
    }
}

/// Load all content of an arbitrary repository
///
/// Modules and templates that fail to load abort the whole load. Policy
/// definitions that fail to parse are skipped with a warning so one broken
/// definition does not take the others down.
pub async fn load_from(repo: &dyn Repository) -> RepositoryResult<RepositoryContent> {
    let mut content = RepositoryContent::default();

    for id in repo.list_modules().await? {
        let text = repo.load_module(&id).await?;
        content.add_module(&id, text);
    }

    for id in repo.list_templates().await? {
        let source = repo.load_template(&id).await?;
        content.add_template(&id, source);
    }

    for id in repo.list_policies().await? {
        match repo.load_policy(&id).await {
            Ok((definition, _)) => content.add_policy(definition),
            Err(e) => {
                tracing::warn!(policy = %id, error = %e, "Skipping invalid policy definition");
            }
        }
    }

    tracing::info!(
        modules = content.modules.len(),
        templates = content.templates.len(),
        policies = content.policies.len(),
        "Loaded repository content"
    );

    Ok(content)
}
