//! Template rendering

use crate::error::{Result, TemplateError};
use crate::parser::Template;
use crate::source::TemplateSource;
use serde::Serialize;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Parse cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CachedTemplate {
    source_hash: u64,
    template: Arc<Template>,
}

/// Parsed templates keyed by id, valid only for the source they were parsed from
#[derive(Default)]
struct ParseCache {
    entries: RwLock<HashMap<String, CachedTemplate>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Renders templates from a [`TemplateSource`]
///
/// Without a cache every call reads and parses the template again. With
/// [`Renderer::with_cache`] parsed templates are reused as long as the source
/// text is unchanged.
pub struct Renderer {
    source: Box<dyn TemplateSource>,
    cache: Option<ParseCache>,
}

impl Renderer {
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: None,
        }
    }

    /// Renderer that reuses parsed templates
    pub fn with_cache(source: impl TemplateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: Some(ParseCache::default()),
        }
    }

    /// Render a template with a serializable data record
    pub fn render<T: Serialize + ?Sized>(&self, template_id: &str, data: &T) -> Result<String> {
        let context = serde_json::to_value(data).map_err(|e| TemplateError::InvalidData {
            template: template_id.to_string(),
            message: e.to_string(),
        })?;

        if !context.is_object() {
            return Err(TemplateError::InvalidData {
                template: template_id.to_string(),
                message: "data must serialize to a mapping".to_string(),
            });
        }

        self.render_value(template_id, &context)
    }

    /// Render a template with an already serialized context
    pub fn render_value(&self, template_id: &str, context: &Value) -> Result<String> {
        let text = self
            .source
            .template_text(template_id)
            .ok_or_else(|| TemplateError::NotFound {
                template: template_id.to_string(),
            })?;

        let template = self.parsed(template_id, &text)?;
        let output = template.render(context)?;

        tracing::debug!(
            template = template_id,
            bytes = output.len(),
            "Rendered template"
        );
        Ok(output)
    }

    /// Parse a template without rendering it
    pub fn check(&self, template_id: &str) -> Result<Arc<Template>> {
        let text = self
            .source
            .template_text(template_id)
            .ok_or_else(|| TemplateError::NotFound {
                template: template_id.to_string(),
            })?;
        self.parsed(template_id, &text)
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| CacheStats {
            hits: cache.hits.load(Ordering::Relaxed),
            misses: cache.misses.load(Ordering::Relaxed),
            size: cache
                .entries
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
        })
    }

    fn parsed(&self, template_id: &str, text: &str) -> Result<Arc<Template>> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(Template::parse(template_id, text)?));
        };

        let source_hash = hash_source(text);
        {
            let entries = cache.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = entries.get(template_id) {
                if cached.source_hash == source_hash {
                    cache.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(Arc::clone(&cached.template));
                }
            }
        }

        cache.misses.fetch_add(1, Ordering::Relaxed);
        let template = Arc::new(Template::parse(template_id, text)?);
        cache
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                template_id.to_string(),
                CachedTemplate {
                    source_hash,
                    template: Arc::clone(&template),
                },
            );
        Ok(template)
    }
}

fn hash_source(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
