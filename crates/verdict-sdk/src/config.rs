//! Configuration types for DecisionService

use serde::{Deserialize, Serialize};

/// Engine options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Reuse parsed templates across renders
    pub enable_template_cache: bool,

    /// Check module declarations for conflicts before compiling
    pub strict_validation: bool,
}

impl EngineOptions {
    pub fn new() -> Self {
        Self {
            enable_template_cache: true,
            strict_validation: true,
        }
    }

    pub fn enable_template_cache(mut self, enable: bool) -> Self {
        self.enable_template_cache = enable;
        self
    }

    pub fn strict_validation(mut self, enable: bool) -> Self {
        self.strict_validation = enable;
        self
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new()
    }
}
