//! Data models for the repository layer

use crate::error::{RepositoryError, RepositoryResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use verdict_core::{QueryPath, ResultShape};

/// Directory holding rule module files
pub const MODULES_DIR: &str = "modules";
/// Directory holding rule templates
pub const TEMPLATES_DIR: &str = "templates";
/// Directory holding policy definitions
pub const DEFINITIONS_DIR: &str = "definitions";

pub const MODULE_EXTENSION: &str = "rego";
pub const TEMPLATE_SUFFIX: &str = ".rego.tmpl";

/// Reduce a module identifier to its id
///
/// `modules/resource_check.rego`, `resource_check.rego` and `resource_check`
/// all name the module `resource_check`.
pub fn module_id(identifier: &str) -> &str {
    let id = identifier
        .strip_prefix(MODULES_DIR)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(identifier);
    id.strip_suffix(".rego").unwrap_or(id)
}

/// Reduce a template identifier to its id
pub fn template_id(identifier: &str) -> &str {
    let id = identifier
        .strip_prefix(TEMPLATES_DIR)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(identifier);
    id.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(id)
}

/// A policy definition stored as YAML
///
/// ```yaml
/// id: access_check
/// query: data.final_check.result
/// shape: access
/// modules:
///   - name: resource_check
///     template: resource_check
///   - name: final_check
///     file: modules/final_check.rego
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDefinition {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Query path of the decision
    pub query: String,

    #[serde(default)]
    pub shape: ResultShape,

    pub modules: Vec<ModuleEntry>,

    /// Data record for templated modules; callers may supply their own instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_data: Option<Value>,
}

impl PolicyDefinition {
    pub fn from_yaml(yaml: &str) -> RepositoryResult<Self> {
        let definition: PolicyDefinition = serde_yaml::from_str(yaml)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Check the definition without loading anything it references
    pub fn validate(&self) -> RepositoryResult<()> {
        let invalid = |reason: String| RepositoryError::InvalidDefinition {
            id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty".to_string()));
        }
        QueryPath::parse(&self.query).map_err(|e| invalid(e.to_string()))?;
        if self.modules.is_empty() {
            return Err(invalid("at least one module is required".to_string()));
        }
        for entry in &self.modules {
            entry.kind().map_err(|reason| invalid(reason))?;
        }
        Ok(())
    }

    /// Template ids referenced by the definition
    pub fn template_ids(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().filter_map(|m| m.template.as_deref())
    }

    /// Module files referenced by the definition
    pub fn module_files(&self) -> impl Iterator<Item = &Path> {
        self.modules.iter().filter_map(|m| m.file.as_deref())
    }
}

/// One module of a policy definition; exactly one body field is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// Body of a [`ModuleEntry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleEntryKind<'a> {
    Inline(&'a str),
    File(&'a Path),
    Template(&'a str),
}

impl ModuleEntry {
    pub fn kind(&self) -> Result<ModuleEntryKind<'_>, String> {
        match (&self.inline, &self.file, &self.template) {
            (Some(text), None, None) => Ok(ModuleEntryKind::Inline(text)),
            (None, Some(path), None) => Ok(ModuleEntryKind::File(path)),
            (None, None, Some(id)) => Ok(ModuleEntryKind::Template(id)),
            (None, None, None) => Err(format!(
                "module '{}' needs one of inline, file or template",
                self.name
            )),
            _ => Err(format!(
                "module '{}' sets more than one of inline, file and template",
                self.name
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_CHECK: &str = r#"
id: access_check
query: data.final_check.result
shape: access
modules:
  - name: resource_check
    template: resource_check
  - name: permission_check
    template: permission_check
  - name: final_check
    file: modules/final_check.rego
template_data:
  source_uuid: 0FF8AFB4-55D2-4836-B17C-643AD59BBB2F
  source_slug: some_slug
  required_permissions: [read, write]
"#;

    #[test]
    fn test_parse_definition() {
        let definition = PolicyDefinition::from_yaml(ACCESS_CHECK).unwrap();

        assert_eq!(definition.id, "access_check");
        assert_eq!(definition.shape, ResultShape::Access);
        assert_eq!(definition.modules.len(), 3);
        assert_eq!(
            definition.template_ids().collect::<Vec<_>>(),
            vec!["resource_check", "permission_check"]
        );
        assert_eq!(
            definition.module_files().collect::<Vec<_>>(),
            vec![Path::new("modules/final_check.rego")]
        );
        let data = definition.template_data.unwrap();
        assert_eq!(data["source_slug"], "some_slug");
    }

    #[test]
    fn test_shape_defaults_to_auto() {
        let yaml = r#"
id: authz
query: data.authorization.allow
modules:
  - name: authorization
    inline: "package authorization"
"#;
        let definition = PolicyDefinition::from_yaml(yaml).unwrap();
        assert_eq!(definition.shape, ResultShape::Auto);
        assert_eq!(
            definition.modules[0].kind().unwrap(),
            ModuleEntryKind::Inline("package authorization")
        );
    }

    #[test]
    fn test_entry_with_two_bodies_rejected() {
        let yaml = r#"
id: broken
query: data.a.b
modules:
  - name: a
    inline: "package a"
    file: modules/a.rego
"#;
        let err = PolicyDefinition::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidDefinition { .. }));
        assert!(err.to_string().contains("more than one"));
    }

    #[test]
    fn test_bad_query_rejected() {
        let yaml = r#"
id: broken
query: final_check.result
modules:
  - name: a
    inline: "package a"
"#;
        assert!(PolicyDefinition::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_empty_modules_rejected() {
        let yaml = "id: broken\nquery: data.a.b\nmodules: []\n";
        let err = PolicyDefinition::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("at least one module"));
    }

    #[test]
    fn test_identifier_normalization() {
        assert_eq!(module_id("modules/resource_check.rego"), "resource_check");
        assert_eq!(module_id("resource_check.rego"), "resource_check");
        assert_eq!(module_id("resource_check"), "resource_check");
        assert_eq!(template_id("templates/final_check.rego.tmpl"), "final_check");
        assert_eq!(template_id("final_check"), "final_check");
    }
}
