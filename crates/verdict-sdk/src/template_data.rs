//! Data record for the resource and permission templates

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Identity of a protected resource and the permissions it requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTemplateData {
    pub source_uuid: String,
    pub source_slug: String,
    #[serde(default)]
    pub required_permissions: Vec<String>,
}

impl PolicyTemplateData {
    pub fn new(source_uuid: impl Into<String>, source_slug: impl Into<String>) -> Self {
        Self {
            source_uuid: source_uuid.into(),
            source_slug: source_slug.into(),
            required_permissions: Vec::new(),
        }
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.required_permissions.push(permission.into());
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Rendering context for templates
    pub fn to_context(&self) -> Value {
        json!({
            "source_uuid": self.source_uuid,
            "source_slug": self.source_slug,
            "required_permissions": self.required_permissions,
        })
    }
}

/// Read `required_permissions` out of an arbitrary template context
pub(crate) fn declared_permissions(context: &Value) -> Option<Vec<String>> {
    context
        .get("required_permissions")?
        .as_array()?
        .iter()
        .map(|p| p.as_str().map(str::to_string))
        .collect()
}
