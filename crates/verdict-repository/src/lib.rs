//! Repository layer for the Verdict decision layer
//!
//! Stores the artifacts a decision is assembled from: rule modules, rule
//! templates and YAML policy definitions.
//!
//! - **File system repository**: a directory with `modules/`, `templates/`
//!   and `definitions/`
//! - **Memory repository**: maps filled by the caller
//! - **Loader**: reads a whole repository into a [`RepositoryContent`], which
//!   then serves module texts and templates synchronously
//!
//! # Quick Start
//!
//! ```no_run
//! use verdict_repository::{RepositoryConfig, RepositoryLoader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let content = RepositoryLoader::new(RepositoryConfig::file_system("policies"))
//!         .load_all()
//!         .await?;
//!
//!     for policy in &content.policies {
//!         println!("{} -> {}", policy.id, policy.query);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod file_system;
pub mod loader;
pub mod memory;
pub mod models;
pub mod traits;

pub use config::{ConfigError, RepositoryConfig, RepositorySource};
pub use content::RepositoryContent;
pub use error::{RepositoryError, RepositoryResult};
pub use file_system::FileSystemRepository;
pub use loader::{load_from, RepositoryLoader};
pub use memory::MemoryRepository;
pub use models::{ModuleEntry, ModuleEntryKind, PolicyDefinition};
pub use traits::Repository;
