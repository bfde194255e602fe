//! Repository content types

use std::collections::BTreeMap;
use std::path::Path;
use verdict_core::{LoadError, ModuleLoader};
use verdict_template::TemplateSource;

use crate::models::{module_id, template_id, PolicyDefinition};

/// Everything loaded from a repository
///
/// Implements [`ModuleLoader`] and [`TemplateSource`], so file-backed and
/// templated modules can be resolved from it without further I/O.
#[derive(Debug, Clone, Default)]
pub struct RepositoryContent {
    /// Module texts keyed by module id
    pub modules: BTreeMap<String, String>,

    /// Template sources keyed by template id
    pub templates: BTreeMap<String, String>,

    /// Validated policy definitions
    pub policies: Vec<PolicyDefinition>,
}

impl RepositoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, identifier: &str, text: impl Into<String>) {
        self.modules
            .insert(module_id(identifier).to_string(), text.into());
    }

    pub fn add_template(&mut self, identifier: &str, source: impl Into<String>) {
        self.templates
            .insert(template_id(identifier).to_string(), source.into());
    }

    pub fn add_policy(&mut self, definition: PolicyDefinition) {
        self.policies.push(definition);
    }

    pub fn module(&self, identifier: &str) -> Option<&str> {
        self.modules.get(module_id(identifier)).map(String::as_str)
    }

    pub fn template(&self, identifier: &str) -> Option<&str> {
        self.templates.get(template_id(identifier)).map(String::as_str)
    }

    pub fn policy(&self, id: &str) -> Option<&PolicyDefinition> {
        self.policies.iter().find(|p| p.id == id)
    }

    /// Merge another content set into this one; entries from `other` win
    pub fn merge(&mut self, other: RepositoryContent) {
        self.modules.extend(other.modules);
        self.templates.extend(other.templates);
        for definition in other.policies {
            self.policies.retain(|p| p.id != definition.id);
            self.policies.push(definition);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.templates.is_empty() && self.policies.is_empty()
    }
}

impl ModuleLoader for RepositoryContent {
    fn load_module_text(&self, identifier: &Path) -> Result<String, LoadError> {
        let key = identifier.to_string_lossy();
        self.module(&key)
            .map(str::to_string)
            .ok_or_else(|| LoadError::NotFound {
                identifier: key.into_owned(),
            })
    }
}

impl TemplateSource for RepositoryContent {
    fn template_text(&self, id: &str) -> Option<String> {
        self.template(id).map(str::to_string)
    }
}
