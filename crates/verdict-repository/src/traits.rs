//! Core trait definitions for the repository pattern
//!
//! A [`Repository`] stores three kinds of artifacts:
//!
//! - rule modules (`modules/<id>.rego`)
//! - rule templates (`templates/<id>.rego.tmpl`)
//! - policy definitions (`definitions/<id>.yaml`)
//!
//! ```no_run
//! use verdict_repository::{FileSystemRepository, Repository};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let repo = FileSystemRepository::new("policies")?;
//!
//! // Load by relative path or by id
//! let text = repo.load_module("modules/final_check.rego").await?;
//! let same = repo.load_module("final_check").await?;
//! assert_eq!(text, same);
//!
//! let (definition, _yaml) = repo.load_policy("access_check").await?;
//! println!("{} -> {}", definition.id, definition.query);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::models::PolicyDefinition;
use crate::RepositoryResult;

/// Read-only access to stored policy artifacts
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Load the text of a rule module by relative path or id
    async fn load_module(&self, identifier: &str) -> RepositoryResult<String>;

    /// Load the source of a rule template by id
    async fn load_template(&self, identifier: &str) -> RepositoryResult<String>;

    /// Load and validate a policy definition
    ///
    /// Returns the definition and its raw YAML.
    async fn load_policy(&self, identifier: &str)
        -> RepositoryResult<(PolicyDefinition, String)>;

    /// Ids of all stored modules, sorted
    async fn list_modules(&self) -> RepositoryResult<Vec<String>>;

    /// Ids of all stored templates, sorted
    async fn list_templates(&self) -> RepositoryResult<Vec<String>>;

    /// Ids of all stored policy definitions, sorted
    async fn list_policies(&self) -> RepositoryResult<Vec<String>>;

    async fn module_exists(&self, identifier: &str) -> bool {
        self.load_module(identifier).await.is_ok()
    }

    async fn template_exists(&self, identifier: &str) -> bool {
        self.load_template(identifier).await.is_ok()
    }
}
