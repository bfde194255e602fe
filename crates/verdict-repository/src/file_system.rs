//! File system based repository implementation

use async_trait::async_trait;
use path_absolutize::Absolutize;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{
    module_id, template_id, PolicyDefinition, DEFINITIONS_DIR, MODULES_DIR, MODULE_EXTENSION,
    TEMPLATES_DIR, TEMPLATE_SUFFIX,
};
use crate::traits::Repository;

/// File system based repository
///
/// Expected layout below the root:
///
/// ```text
/// modules/<id>.rego
/// templates/<id>.rego.tmpl
/// definitions/<id>.yaml
/// ```
#[derive(Debug, Clone)]
pub struct FileSystemRepository {
    root_path: PathBuf,
}

impl FileSystemRepository {
    /// Create a new file system repository
    ///
    /// # Example
    /// ```no_run
    /// use verdict_repository::FileSystemRepository;
    ///
    /// let repo = FileSystemRepository::new("policies").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        let path = root_path.as_ref();

        if !path.exists() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path
            .absolutize()
            .map_err(|e| RepositoryError::Other(format!("Failed to absolutize path: {}", e)))?
            .to_path_buf();

        Ok(Self {
            root_path: abs_path,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Resolve a module identifier to a file below the root
    ///
    /// Identifiers ending in `.rego` are relative paths; anything else is an
    /// id looked up in `modules/`.
    fn module_path(&self, identifier: &str) -> RepositoryResult<PathBuf> {
        let relative = if identifier.ends_with(".rego") && identifier.contains('/') {
            PathBuf::from(identifier)
        } else {
            Path::new(MODULES_DIR).join(format!("{}.{}", module_id(identifier), MODULE_EXTENSION))
        };
        self.contained(relative)
    }

    fn template_path(&self, identifier: &str) -> RepositoryResult<PathBuf> {
        let relative =
            Path::new(TEMPLATES_DIR).join(format!("{}{}", template_id(identifier), TEMPLATE_SUFFIX));
        self.contained(relative)
    }

    fn policy_path(&self, identifier: &str) -> RepositoryResult<PathBuf> {
        if identifier.ends_with(".yaml") || identifier.ends_with(".yml") {
            return self.contained(PathBuf::from(identifier));
        }

        let dir = Path::new(DEFINITIONS_DIR);
        let yaml = self.contained(dir.join(format!("{}.yaml", identifier)))?;
        if yaml.exists() {
            return Ok(yaml);
        }
        self.contained(dir.join(format!("{}.yml", identifier)))
    }

    /// Join a relative path onto the root, refusing anything that escapes it
    fn contained(&self, relative: PathBuf) -> RepositoryResult<PathBuf> {
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(RepositoryError::InvalidPath { path: relative });
        }
        Ok(self.root_path.join(relative))
    }

    async fn read(&self, path: &Path) -> RepositoryResult<String> {
        match fs::read_to_string(path).await {
            Ok(content) => {
                tracing::debug!(path = %path.display(), bytes = content.len(), "Loaded artifact");
                Ok(content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RepositoryError::NotFound {
                path: path.display().to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// List file names in a directory below the root that end with `suffix`,
    /// with the suffix removed
    async fn list_ids(&self, dir: &str, suffixes: &[&str]) -> RepositoryResult<Vec<String>> {
        let dir_path = self.root_path.join(dir);
        if !dir_path.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&dir_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(id) = suffixes.iter().find_map(|s| name.strip_suffix(s)) {
                ids.push(id.to_string());
            }
        }

        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[async_trait]
impl Repository for FileSystemRepository {
    async fn load_module(&self, identifier: &str) -> RepositoryResult<String> {
        let path = self.module_path(identifier)?;
        self.read(&path).await
    }

    async fn load_template(&self, identifier: &str) -> RepositoryResult<String> {
        let path = self.template_path(identifier)?;
        self.read(&path).await
    }

    async fn load_policy(
        &self,
        identifier: &str,
    ) -> RepositoryResult<(PolicyDefinition, String)> {
        let path = self.policy_path(identifier)?;
        let yaml = self.read(&path).await?;
        let definition = PolicyDefinition::from_yaml(&yaml)?;
        Ok((definition, yaml))
    }

    async fn list_modules(&self) -> RepositoryResult<Vec<String>> {
        self.list_ids(MODULES_DIR, &[".rego"]).await
    }

    async fn list_templates(&self) -> RepositoryResult<Vec<String>> {
        self.list_ids(TEMPLATES_DIR, &[TEMPLATE_SUFFIX]).await
    }

    async fn list_policies(&self) -> RepositoryResult<Vec<String>> {
        self.list_ids(DEFINITIONS_DIR, &[".yaml", ".yml"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_rejected() {
        let err = FileSystemRepository::new("/definitely/not/here").unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidPath { .. }));
    }

    #[test]
    fn test_module_path_resolution() {
        let dir = TempDir::new().unwrap();
        let repo = FileSystemRepository::new(dir.path()).unwrap();

        let by_id = repo.module_path("final_check").unwrap();
        let by_path = repo.module_path("modules/final_check.rego").unwrap();
        assert_eq!(by_id, by_path);
        assert!(by_id.ends_with("modules/final_check.rego"));
    }

    #[test]
    fn test_escaping_paths_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = FileSystemRepository::new(dir.path()).unwrap();

        assert!(repo.module_path("../secrets/key.rego").is_err());
        assert!(repo.policy_path("/etc/passwd.yaml").is_err());
    }
}
