//! In-memory repository

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::config::RepositoryConfig;
use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{module_id, template_id, PolicyDefinition};
use crate::traits::Repository;

/// Repository backed by maps; used in tests and when policies are embedded
/// in the binary
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    modules: BTreeMap<String, String>,
    templates: BTreeMap<String, String>,
    policies: BTreeMap<String, String>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, identifier: &str, text: impl Into<String>) -> Self {
        self.modules
            .insert(module_id(identifier).to_string(), text.into());
        self
    }

    pub fn with_template(mut self, identifier: &str, source: impl Into<String>) -> Self {
        self.templates
            .insert(template_id(identifier).to_string(), source.into());
        self
    }

    /// Repository holding the content embedded in a memory configuration
    pub fn from_config(config: &RepositoryConfig) -> Self {
        let mut repo = Self::new();
        for (identifier, text) in &config.modules {
            repo = repo.with_module(identifier, text.as_str());
        }
        for (identifier, source) in &config.templates {
            repo = repo.with_template(identifier, source.as_str());
        }
        for (id, yaml) in &config.policies {
            repo = repo.with_policy(id.as_str(), yaml.as_str());
        }
        repo
    }

    /// Store a policy definition as YAML; it is validated on load
    pub fn with_policy(mut self, id: impl Into<String>, yaml: impl Into<String>) -> Self {
        self.policies.insert(id.into(), yaml.into());
        self
    }
}

fn lookup(map: &BTreeMap<String, String>, id: &str) -> RepositoryResult<String> {
    map.get(id).cloned().ok_or_else(|| RepositoryError::NotFound {
        path: id.to_string(),
    })
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn load_module(&self, identifier: &str) -> RepositoryResult<String> {
        lookup(&self.modules, module_id(identifier))
    }

    async fn load_template(&self, identifier: &str) -> RepositoryResult<String> {
        lookup(&self.templates, template_id(identifier))
    }

    async fn load_policy(
        &self,
        identifier: &str,
    ) -> RepositoryResult<(PolicyDefinition, String)> {
        let yaml = lookup(&self.policies, identifier)?;
        let definition = PolicyDefinition::from_yaml(&yaml)?;
        Ok((definition, yaml))
    }

    async fn list_modules(&self) -> RepositoryResult<Vec<String>> {
        Ok(self.modules.keys().cloned().collect())
    }

    async fn list_templates(&self) -> RepositoryResult<Vec<String>> {
        Ok(self.templates.keys().cloned().collect())
    }

    async fn list_policies(&self) -> RepositoryResult<Vec<String>> {
        Ok(self.policies.keys().cloned().collect())
    }
}
