//! Free functions over the decision pipeline
//!
//! `render` -> `build_module_set` -> `prepare` -> `decide`, for callers that
//! do not need a [`crate::DecisionService`].

use crate::error::Result;
use serde::Serialize;
use verdict_core::{Decision, InputDocument, ModuleLoader, ModuleSet, RuleModuleSource};
use verdict_runtime::{DecisionQuery, PreparedQuery};
use verdict_template::Renderer;

/// Render a template with a data record
pub fn render<T: Serialize + ?Sized>(
    renderer: &Renderer,
    template_id: &str,
    data: &T,
) -> Result<String> {
    Ok(renderer.render(template_id, data)?)
}

/// Bind rule modules to a query path
pub fn build_module_set(
    sources: impl IntoIterator<Item = RuleModuleSource>,
    query_path: &str,
) -> Result<ModuleSet> {
    Ok(ModuleSet::new(sources, query_path)?)
}

/// Compile a module set with the default engine and result shape
pub fn prepare(
    module_set: ModuleSet,
    loader: &dyn ModuleLoader,
    renderer: &Renderer,
) -> Result<PreparedQuery> {
    Ok(DecisionQuery::new(module_set).prepare(loader, renderer)?)
}

/// Evaluate a prepared query against one input document
pub fn decide(prepared: &PreparedQuery, input: &InputDocument) -> Result<Decision> {
    Ok(prepared.decide(input)?)
}
