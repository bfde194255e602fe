//! Template sources

use std::collections::HashMap;

/// Lookup of template source text by identifier
pub trait TemplateSource: Send + Sync {
    /// Source text for a template, or `None` if it does not exist
    fn template_text(&self, id: &str) -> Option<String>;
}

/// In-memory template registry
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, String>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, id: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(id, source);
        self
    }

    /// Register or replace a template
    pub fn insert(&mut self, id: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(id.into(), source.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateSource for TemplateRegistry {
    fn template_text(&self, id: &str) -> Option<String> {
        self.templates.get(id).cloned()
    }
}

impl<S: TemplateSource + ?Sized> TemplateSource for std::sync::Arc<S> {
    fn template_text(&self, id: &str) -> Option<String> {
        (**self).template_text(id)
    }
}
