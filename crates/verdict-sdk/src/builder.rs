//! Builder pattern for DecisionService

use crate::config::EngineOptions;
use crate::decision_service::DecisionService;
use crate::error::{Result, SdkError};
use crate::template_data::{declared_permissions, PolicyTemplateData};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use verdict_core::{
    LoadError, ModuleBody, ModuleSetBuilder, ResultShape, RuleModuleSource, StaticModules,
};
use verdict_repository::{
    ModuleEntryKind, PolicyDefinition, Repository, RepositoryConfig, RepositoryContent,
    RepositoryLoader,
};
use verdict_runtime::{DecisionQuery, RuntimeError};
use verdict_template::{Renderer, TemplateRegistry};

/// A module added to the builder, resolved when the service is built
#[derive(Debug, Clone)]
enum PendingModule {
    Inline { name: String, text: String },
    File { name: String, path: PathBuf },
    Template { name: String, template_id: String },
}

impl PendingModule {
    fn name(&self) -> &str {
        match self {
            PendingModule::Inline { name, .. }
            | PendingModule::File { name, .. }
            | PendingModule::Template { name, .. } => name,
        }
    }
}

/// Builder for DecisionService
///
/// # Example
///
/// ```rust,ignore
/// use verdict_sdk::{DecisionServiceBuilder, PolicyTemplateData, RepositoryConfig, ResultShape};
///
/// // Modules and templates from a policy directory
/// let service = DecisionServiceBuilder::new()
///     .with_repository(RepositoryConfig::file_system("policies"))
///     .with_query("data.final_check.result")
///     .with_shape(ResultShape::Access)
///     .add_template_module("resource_check", "resource_check")
///     .add_template_module("permission_check", "permission_check")
///     .add_file_module("final_check", "modules/final_check.rego")
///     .with_template_data(PolicyTemplateData::new(uuid, "some_slug").with_permission("read"))
///     .build()
///     .await?;
///
/// // Inline rules only
/// let service = DecisionServiceBuilder::new()
///     .with_query("data.authorization.allow")
///     .add_inline_module("authorization", rego_text)
///     .build()
///     .await?;
/// ```
pub struct DecisionServiceBuilder {
    query: Option<String>,
    shape: ResultShape,
    modules: Vec<PendingModule>,
    templates: TemplateRegistry,
    template_context: Option<Value>,
    declared_permissions: Option<Vec<String>>,
    repository_config: Option<RepositoryConfig>,
    repository: Option<Arc<dyn Repository>>,
    options: EngineOptions,
}

impl DecisionServiceBuilder {
    pub fn new() -> Self {
        Self {
            query: None,
            shape: ResultShape::default(),
            modules: Vec::new(),
            templates: TemplateRegistry::new(),
            template_context: None,
            declared_permissions: None,
            repository_config: None,
            repository: None,
            options: EngineOptions::default(),
        }
    }

    /// Start from a YAML policy definition
    ///
    /// The definition's template data, if any, is used unless the caller
    /// supplies its own.
    pub fn from_definition(definition: PolicyDefinition) -> Self {
        let mut builder = Self::new()
            .with_query(definition.query.clone())
            .with_shape(definition.shape);

        for entry in &definition.modules {
            // Definitions are validated when parsed; an invalid entry is
            // skipped here and reported as a missing module on build.
            match entry.kind() {
                Ok(ModuleEntryKind::Inline(text)) => {
                    builder = builder.add_inline_module(entry.name.clone(), text)
                }
                Ok(ModuleEntryKind::File(path)) => {
                    builder = builder.add_file_module(entry.name.clone(), path)
                }
                Ok(ModuleEntryKind::Template(id)) => {
                    builder = builder.add_template_module(entry.name.clone(), id)
                }
                Err(reason) => {
                    tracing::warn!(policy = %definition.id, %reason, "Skipping invalid module entry")
                }
            }
        }

        if let Some(context) = definition.template_data {
            builder = builder.with_template_context(context);
        }
        builder
    }

    // ========== Repository Configuration ==========

    /// Load every artifact of a repository before building
    pub fn with_repository(mut self, config: RepositoryConfig) -> Self {
        self.repository_config = Some(config);
        self
    }

    /// Fetch only the artifacts the modules reference from a repository
    pub fn with_repository_backend(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    // ========== Query ==========

    pub fn with_query(mut self, query_path: impl Into<String>) -> Self {
        self.query = Some(query_path.into());
        self
    }

    pub fn with_shape(mut self, shape: ResultShape) -> Self {
        self.shape = shape;
        self
    }

    /// Required permissions in the order missing ones are reported back
    ///
    /// Defaults to the `required_permissions` of the template data.
    pub fn with_declared_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared_permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    // ========== Modules ==========

    pub fn add_inline_module(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.modules.push(PendingModule::Inline {
            name: name.into(),
            text: text.into(),
        });
        self
    }

    /// Add a module read from a file
    ///
    /// With a repository the path is looked up there; otherwise it is read
    /// from disk relative to the working directory.
    pub fn add_file_module(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.modules.push(PendingModule::File {
            name: name.into(),
            path: path.into(),
        });
        self
    }

    /// Add a module rendered from a template with the builder's template data
    pub fn add_template_module(
        mut self,
        name: impl Into<String>,
        template_id: impl Into<String>,
    ) -> Self {
        self.modules.push(PendingModule::Template {
            name: name.into(),
            template_id: template_id.into(),
        });
        self
    }

    /// Register template source directly; takes precedence over a repository
    pub fn add_template(mut self, id: impl Into<String>, source: impl Into<String>) -> Self {
        self.templates.insert(id, source);
        self
    }

    // ========== Template data ==========

    pub fn with_template_data(self, data: PolicyTemplateData) -> Self {
        self.with_template_context(data.to_context())
    }

    /// Arbitrary rendering context for templated modules
    pub fn with_template_context(mut self, context: Value) -> Self {
        self.template_context = Some(context);
        self
    }

    // ========== Options ==========

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn enable_template_cache(mut self, enable: bool) -> Self {
        self.options.enable_template_cache = enable;
        self
    }

    pub fn strict_validation(mut self, enable: bool) -> Self {
        self.options.strict_validation = enable;
        self
    }

    /// Build the decision service
    ///
    /// Loads referenced artifacts, then renders, validates and compiles all
    /// modules. Nothing is evaluated yet.
    pub async fn build(mut self) -> Result<DecisionService> {
        let query = self
            .query
            .take()
            .ok_or_else(|| SdkError::Config("query path is required".to_string()))?;

        tracing::debug!(
            query = %query,
            modules = ?self.modules.iter().map(PendingModule::name).collect::<Vec<_>>(),
            "Building decision service"
        );

        let content = match &self.repository_config {
            Some(config) => Some(RepositoryLoader::new(config.clone()).load_all().await?),
            None => None,
        };

        let loader = self.load_module_files(content.as_ref()).await?;
        self.load_templates(content.as_ref()).await?;

        let mut set = ModuleSetBuilder::new(&query)?;
        for module in &self.modules {
            let source = match module {
                PendingModule::Inline { name, text } => RuleModuleSource::inline(name, text),
                PendingModule::File { name, path } => RuleModuleSource::file(name, path),
                PendingModule::Template { name, template_id } => {
                    let context = self.template_context.clone().ok_or_else(|| {
                        SdkError::Config(format!(
                            "template data is required for templated module '{}'",
                            name
                        ))
                    })?;
                    RuleModuleSource::new(
                        name.clone(),
                        ModuleBody::Template {
                            template_id: template_id.clone(),
                            context,
                        },
                    )
                }
            };
            set = set.add(source)?;
        }
        let module_set = set.build()?;

        let declared = self.declared_permissions.take().or_else(|| {
            self.template_context
                .as_ref()
                .and_then(declared_permissions)
        });

        let mut decision_query = DecisionQuery::new(module_set)
            .with_shape(self.shape)
            .with_strict_validation(self.options.strict_validation);
        if let Some(declared) = declared {
            decision_query = decision_query.with_declared_permissions(declared);
        }

        let renderer = if self.options.enable_template_cache {
            Renderer::with_cache(self.templates)
        } else {
            Renderer::new(self.templates)
        };

        let prepared = decision_query.prepare(&loader, &renderer)?;
        Ok(DecisionService::new(prepared, self.options))
    }

    /// Collect the text of every file-backed module
    async fn load_module_files(&self, content: Option<&RepositoryContent>) -> Result<StaticModules> {
        let mut loader = StaticModules::new();

        for module in &self.modules {
            let PendingModule::File { name, path } = module else {
                continue;
            };
            let identifier = path.to_string_lossy();

            let text = if let Some(content) = content {
                content.module(&identifier).map(str::to_string)
            } else if let Some(repository) = &self.repository {
                match repository.load_module(&identifier).await {
                    Ok(text) => Some(text),
                    Err(e) if e.is_not_found() => None,
                    Err(e) => return Err(e.into()),
                }
            } else {
                match tokio::fs::read_to_string(path).await {
                    Ok(text) => Some(text),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                    Err(e) => {
                        return Err(RuntimeError::ModuleLoad {
                            module: name.clone(),
                            source: LoadError::Io {
                                identifier: identifier.into_owned(),
                                message: e.to_string(),
                            },
                        }
                        .into())
                    }
                }
            };

            // A module that is not found stays out of the loader, so
            // preparation reports it by name.
            if let Some(text) = text {
                loader.insert(path.clone(), text);
            }
        }

        Ok(loader)
    }

    /// Fetch templates referenced by templated modules that were not
    /// registered directly
    async fn load_templates(&mut self, content: Option<&RepositoryContent>) -> Result<()> {
        let wanted: Vec<String> = self
            .modules
            .iter()
            .filter_map(|m| match m {
                PendingModule::Template { template_id, .. } => Some(template_id.clone()),
                _ => None,
            })
            .filter(|id| !self.templates.contains(id))
            .collect();

        for id in wanted {
            let source = if let Some(content) = content {
                content.template(&id).map(str::to_string)
            } else if let Some(repository) = &self.repository {
                match repository.load_template(&id).await {
                    Ok(source) => Some(source),
                    Err(e) if e.is_not_found() => None,
                    Err(e) => return Err(e.into()),
                }
            } else {
                None
            };

            if let Some(source) = source {
                self.templates.insert(id, source);
            }
        }

        Ok(())
    }

    #[cfg(test)]
    fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(PendingModule::name).collect()
    }
}

impl Default for DecisionServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
