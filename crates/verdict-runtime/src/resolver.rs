//! Module resolution
//!
//! Turns every module of a [`ModuleSet`] into rule text: inline bodies are
//! taken as they are, file bodies go through a [`ModuleLoader`] and template
//! bodies are rendered.

use crate::error::{Result, RuntimeError};
use verdict_core::{ModuleBody, ModuleLoader, ModuleSet, QueryPath};
use verdict_template::Renderer;

/// A module whose text is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub name: String,
    pub text: String,
}

impl ResolvedModule {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Resolved modules plus the query path, ready for validation and compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    modules: Vec<ResolvedModule>,
    query_path: QueryPath,
}

impl CompilationUnit {
    pub fn new(modules: Vec<ResolvedModule>, query_path: QueryPath) -> Self {
        Self {
            modules,
            query_path,
        }
    }

    pub fn modules(&self) -> &[ResolvedModule] {
        &self.modules
    }

    pub fn query_path(&self) -> &QueryPath {
        &self.query_path
    }
}

/// Resolve every module body of a set to text
///
/// Fails on the first module that cannot be resolved; the error names it.
pub fn resolve(
    module_set: &ModuleSet,
    loader: &dyn ModuleLoader,
    renderer: &Renderer,
) -> Result<CompilationUnit> {
    let mut modules = Vec::with_capacity(module_set.len());

    for source in module_set.modules() {
        let text = match source.body() {
            ModuleBody::Inline(text) => text.clone(),
            ModuleBody::File(path) => {
                loader
                    .load_module_text(path)
                    .map_err(|e| RuntimeError::ModuleLoad {
                        module: source.name().to_string(),
                        source: e,
                    })?
            }
            ModuleBody::Template {
                template_id,
                context,
            } => renderer
                .render_value(template_id, context)
                .map_err(|e| RuntimeError::Template {
                    module: source.name().to_string(),
                    source: e,
                })?,
        };

        modules.push(ResolvedModule::new(source.name(), text));
    }

    Ok(CompilationUnit::new(
        modules,
        module_set.query_path().clone(),
    ))
}
