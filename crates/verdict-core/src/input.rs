//! Structured input documents submitted with each evaluation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `input` document of one evaluation
///
/// Always a mapping from string keys to JSON-like values (identifiers,
/// role names, permission lists, nested objects).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputDocument(Map<String, Value>);

impl InputDocument {
    /// Create an empty input document
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Add a field, replacing any previous value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a field, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Build an input document from a JSON value
    ///
    /// Returns `None` when the value is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Render the document as JSON text
    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

impl From<Map<String, Value>> for InputDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<InputDocument> for Value {
    fn from(input: InputDocument) -> Self {
        Value::Object(input.0)
    }
}
