//! Repository configuration types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Repository source type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositorySource {
    /// Load from a directory on disk
    #[default]
    FileSystem,
    /// Content embedded in the configuration itself
    Memory,
}

/// Repository configuration
///
/// # Examples
///
/// ```rust
/// use verdict_repository::RepositoryConfig;
///
/// let config = RepositoryConfig::file_system("policies");
/// assert!(config.validate().is_ok());
///
/// let config = RepositoryConfig::memory()
///     .with_module("authorization", "package authorization");
/// assert!(config.base_path.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub source: RepositorySource,

    /// Root directory (required for the file system source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// Module texts by identifier (memory source)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, String>,

    /// Template sources by identifier (memory source)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub templates: BTreeMap<String, String>,

    /// Policy definition YAML by id (memory source)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub policies: BTreeMap<String, String>,
}

impl RepositoryConfig {
    pub fn file_system(path: impl Into<String>) -> Self {
        Self {
            source: RepositorySource::FileSystem,
            base_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Empty memory source; fill it with the `with_*` methods
    pub fn memory() -> Self {
        Self {
            source: RepositorySource::Memory,
            ..Self::default()
        }
    }

    pub fn with_module(mut self, identifier: impl Into<String>, text: impl Into<String>) -> Self {
        self.modules.insert(identifier.into(), text.into());
        self
    }

    pub fn with_template(mut self, identifier: impl Into<String>, source: impl Into<String>) -> Self {
        self.templates.insert(identifier.into(), source.into());
        self
    }

    pub fn with_policy(mut self, id: impl Into<String>, yaml: impl Into<String>) -> Self {
        self.policies.insert(id.into(), yaml.into());
        self
    }

    /// Returns an error if a field the source needs is missing
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.source {
            RepositorySource::FileSystem if self.base_path.is_none() => {
                Err(ConfigError::MissingField {
                    kind: "FileSystem".to_string(),
                    field: "base_path".to_string(),
                })
            }
            RepositorySource::FileSystem if self.has_embedded_content() => {
                Err(ConfigError::UnexpectedContent {
                    kind: "FileSystem".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn has_embedded_content(&self) -> bool {
        !(self.modules.is_empty() && self.templates.is_empty() && self.policies.is_empty())
    }
}

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{kind} source requires {field} to be set")]
    MissingField { kind: String, field: String },

    #[error("{kind} source cannot carry embedded modules, templates or policies")]
    UnexpectedContent { kind: String },
}
