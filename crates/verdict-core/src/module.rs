//! Rule module sources and module sets
//!
//! A [`ModuleSet`] is an ordered collection of named rule modules bound to a
//! [`QueryPath`]. It is assembled once through a [`ModuleSetBuilder`] and is
//! immutable afterwards, so nothing can change it once a query has been
//! prepared against it.

use crate::error::{LoadError, ModuleSetError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the text of a rule module comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleBody {
    /// Literal rule text
    Inline(String),

    /// A file resolved through a [`ModuleLoader`] at prepare time
    File(PathBuf),

    /// A template rendered with the given context at prepare time
    Template { template_id: String, context: Value },
}

/// A named rule module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleModuleSource {
    name: String,
    body: ModuleBody,
}

impl RuleModuleSource {
    pub fn new(name: impl Into<String>, body: ModuleBody) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    /// Module with literal rule text
    pub fn inline(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, ModuleBody::Inline(text.into()))
    }

    /// Module read from a file when the set is prepared
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(name, ModuleBody::File(path.into()))
    }

    /// Module rendered from a template and a data record
    ///
    /// The record is serialized immediately, so later changes to the caller's
    /// copy cannot leak into the module.
    pub fn template<T: Serialize>(
        name: impl Into<String>,
        template_id: impl Into<String>,
        data: &T,
    ) -> Result<Self, ModuleSetError> {
        let name = name.into();
        let context =
            serde_json::to_value(data).map_err(|e| ModuleSetError::InvalidTemplateData {
                module: name.clone(),
                message: e.to_string(),
            })?;

        Ok(Self::new(
            name,
            ModuleBody::Template {
                template_id: template_id.into(),
                context,
            },
        ))
    }

    /// Logical name used in diagnostics and error messages
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &ModuleBody {
        &self.body
    }
}

/// Address of the computed value extracted as the decision result
///
/// Always of the form `data.<package segments>.<rule>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueryPath {
    raw: String,
    segments: Vec<String>,
}

impl QueryPath {
    pub fn parse(path: &str) -> Result<Self, ModuleSetError> {
        let invalid = |reason: &str| ModuleSetError::InvalidQueryPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = path.trim().split('.');
        if parts.next() != Some("data") {
            return Err(invalid("must start with 'data.'"));
        }

        let segments: Vec<String> = parts.map(str::to_string).collect();
        if segments.len() < 2 {
            return Err(invalid("expected a package and a rule name"));
        }
        if let Some(bad) = segments.iter().find(|s| !is_identifier(s)) {
            return Err(invalid(&format!("'{}' is not a valid identifier", bad)));
        }

        Ok(Self {
            raw: path.trim().to_string(),
            segments,
        })
    }

    /// Dotted package name, e.g. `final_check`
    pub fn package(&self) -> String {
        self.segments[..self.segments.len() - 1].join(".")
    }

    /// Rule name, e.g. `result`
    pub fn rule(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for QueryPath {
    type Error = ModuleSetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QueryPath> for String {
    fn from(path: QueryPath) -> Self {
        path.raw
    }
}

/// Check whether a string is a valid rule-language identifier
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An immutable set of rule modules bound to a query path
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSet {
    modules: Vec<RuleModuleSource>,
    query_path: QueryPath,
}

impl ModuleSet {
    /// Build a module set in one step
    pub fn new(
        sources: impl IntoIterator<Item = RuleModuleSource>,
        query_path: &str,
    ) -> Result<Self, ModuleSetError> {
        let mut builder = ModuleSetBuilder::new(query_path)?;
        for source in sources {
            builder = builder.add(source)?;
        }
        builder.build()
    }

    pub fn modules(&self) -> &[RuleModuleSource] {
        &self.modules
    }

    pub fn query_path(&self) -> &QueryPath {
        &self.query_path
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Find a module by name
    pub fn get(&self, name: &str) -> Option<&RuleModuleSource> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Names of all modules in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_str())
    }
}

/// Incremental construction of a [`ModuleSet`]
#[derive(Debug, Clone)]
pub struct ModuleSetBuilder {
    modules: Vec<RuleModuleSource>,
    names: HashSet<String>,
    query_path: QueryPath,
}

impl ModuleSetBuilder {
    pub fn new(query_path: &str) -> Result<Self, ModuleSetError> {
        Ok(Self {
            modules: Vec::new(),
            names: HashSet::new(),
            query_path: QueryPath::parse(query_path)?,
        })
    }

    /// Add a module; names must be unique within the set
    pub fn add(mut self, source: RuleModuleSource) -> Result<Self, ModuleSetError> {
        if source.name.trim().is_empty() {
            return Err(ModuleSetError::EmptyName);
        }
        if !self.names.insert(source.name.clone()) {
            return Err(ModuleSetError::DuplicateModule { name: source.name });
        }
        self.modules.push(source);
        Ok(self)
    }

    pub fn add_inline(
        self,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ModuleSetError> {
        self.add(RuleModuleSource::inline(name, text))
    }

    pub fn add_file(
        self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<Self, ModuleSetError> {
        self.add(RuleModuleSource::file(name, path))
    }

    pub fn build(self) -> Result<ModuleSet, ModuleSetError> {
        if self.modules.is_empty() {
            return Err(ModuleSetError::Empty);
        }
        Ok(ModuleSet {
            modules: self.modules,
            query_path: self.query_path,
        })
    }
}

/// Loader for file-backed rule modules
pub trait ModuleLoader {
    fn load_module_text(&self, identifier: &Path) -> Result<String, LoadError>;
}

/// In-memory module texts keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct StaticModules {
    texts: HashMap<PathBuf, String>,
}

impl StaticModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, identifier: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(identifier, text);
        self
    }

    pub fn insert(&mut self, identifier: impl Into<PathBuf>, text: impl Into<String>) {
        self.texts.insert(identifier.into(), text.into());
    }

    pub fn contains(&self, identifier: &Path) -> bool {
        self.texts.contains_key(identifier)
    }
}

impl ModuleLoader for StaticModules {
    fn load_module_text(&self, identifier: &Path) -> Result<String, LoadError> {
        self.texts
            .get(identifier)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                identifier: identifier.display().to_string(),
            })
    }
}
