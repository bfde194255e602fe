//! Decoding raw engine results into typed decisions
//!
//! The evaluation engine hands back an untyped value. It is first narrowed to
//! a [`RawResult`] (boolean or mapping), then decoded against a
//! [`ResultShape`] contract. Every reserved key is type-checked explicitly;
//! a reserved key with the wrong type is an error naming that key, never a
//! silent default.
//!
//! # Reserved keys
//!
//! | Key                   | Type              | Shape        |
//! |-----------------------|-------------------|--------------|
//! | `is_valid`            | boolean           | `Validation` |
//! | `access_allowed`      | boolean           | `Access`     |
//! | `resource_valid`      | boolean           | `Access`     |
//! | `permissions_granted` | boolean           | `Access`     |
//! | `missing_permissions` | sequence<string>  | `Access`     |
//! | `mismatches`          | sequence<mapping> | both         |
//!
//! Unknown keys are ignored.

use crate::decision::{Decision, Diagnostic};
use crate::error::{DecodeError, Result};
use crate::permissions::MissingPermissions;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const IS_VALID_KEY: &str = "is_valid";
pub const ACCESS_ALLOWED_KEY: &str = "access_allowed";
pub const RESOURCE_VALID_KEY: &str = "resource_valid";
pub const PERMISSIONS_GRANTED_KEY: &str = "permissions_granted";
pub const MISSING_PERMISSIONS_KEY: &str = "missing_permissions";
pub const MISMATCHES_KEY: &str = "mismatches";

pub const FIELD_KEY: &str = "field";
pub const EXPECTED_KEY: &str = "expected";
pub const ACTUAL_KEY: &str = "actual";
pub const HINT_KEY: &str = "hint";

/// Pseudo-key used when the whole result has the wrong shape
const RESULT_KEY: &str = "<result>";

/// Untyped value returned by one evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    Boolean(bool),
    Mapping(Map<String, Value>),
}

impl RawResult {
    /// Narrow an arbitrary JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(RawResult::Boolean(b)),
            Value::Object(map) => Ok(RawResult::Mapping(map)),
            other => Err(DecodeError::UnexpectedResult {
                found: type_name(&other).to_string(),
            }),
        }
    }
}

/// Contract describing which keys a query's result carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    /// A plain boolean
    Verdict,

    /// `is_valid` plus `mismatches` on failure
    Validation,

    /// `access_allowed` plus resource/permission sub-verdicts
    Access,

    /// `Access` when `access_allowed` is present, `Validation` otherwise
    #[default]
    Auto,
}

impl ResultShape {
    fn verdict_key(self) -> &'static str {
        match self {
            ResultShape::Access => ACCESS_ALLOWED_KEY,
            _ => IS_VALID_KEY,
        }
    }

    /// Keys that must be present when the verdict is false
    fn required_on_failure(self) -> &'static [&'static str] {
        match self {
            ResultShape::Validation => &[MISMATCHES_KEY],
            ResultShape::Access => &[
                RESOURCE_VALID_KEY,
                PERMISSIONS_GRANTED_KEY,
                MISSING_PERMISSIONS_KEY,
            ],
            ResultShape::Verdict | ResultShape::Auto => &[],
        }
    }

    fn resolve(self, map: &Map<String, Value>) -> ResultShape {
        match self {
            ResultShape::Auto if map.contains_key(ACCESS_ALLOWED_KEY) => ResultShape::Access,
            ResultShape::Auto => ResultShape::Validation,
            shape => shape,
        }
    }
}

/// Decodes raw results against one [`ResultShape`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    shape: ResultShape,
}

impl Decoder {
    pub fn new(shape: ResultShape) -> Self {
        Self { shape }
    }

    pub fn shape(&self) -> ResultShape {
        self.shape
    }

    /// Decode a JSON value, rejecting anything but a boolean or a mapping
    pub fn decode_value(&self, value: Value) -> Result<Decision> {
        self.decode(RawResult::from_value(value)?)
    }

    pub fn decode(&self, raw: RawResult) -> Result<Decision> {
        match raw {
            RawResult::Boolean(allowed) => Ok(Decision::verdict(allowed, ResultShape::Verdict)),
            RawResult::Mapping(map) => self.decode_mapping(&map),
        }
    }

    fn decode_mapping(&self, map: &Map<String, Value>) -> Result<Decision> {
        if self.shape == ResultShape::Verdict {
            return Err(DecodeError::Shape {
                key: RESULT_KEY.to_string(),
                expected: "boolean".to_string(),
                found: "mapping".to_string(),
            });
        }

        let shape = self.shape.resolve(map);
        let verdict_key = shape.verdict_key();
        let allowed = match map.get(verdict_key) {
            Some(value) => expect_bool(verdict_key, value)?,
            None => {
                return Err(DecodeError::MissingKey {
                    key: verdict_key.to_string(),
                })
            }
        };

        // Sub-verdicts are only required on failure, but are checked whenever
        // present
        let required = if allowed {
            &[][..]
        } else {
            shape.required_on_failure()
        };

        let resource_valid = lookup(map, RESOURCE_VALID_KEY, required)?
            .map(|v| expect_bool(RESOURCE_VALID_KEY, v))
            .transpose()?;

        let permissions_granted = lookup(map, PERMISSIONS_GRANTED_KEY, required)?
            .map(|v| expect_bool(PERMISSIONS_GRANTED_KEY, v))
            .transpose()?;

        let missing_permissions = match lookup(map, MISSING_PERMISSIONS_KEY, required)? {
            Some(value) => decode_string_list(MISSING_PERMISSIONS_KEY, value)?,
            None => Vec::new(),
        };

        // A passing decision never carries failure detail
        if allowed {
            return Ok(Decision::passed(shape, resource_valid, permissions_granted));
        }

        let diagnostics = match lookup(map, MISMATCHES_KEY, required)? {
            Some(value) => decode_mismatches(value)?,
            None => Vec::new(),
        };

        Ok(Decision::denied(
            shape,
            resource_valid,
            permissions_granted,
            MissingPermissions::from(missing_permissions),
            diagnostics,
        ))
    }
}

fn lookup<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    required: &[&str],
) -> Result<Option<&'a Value>> {
    match map.get(key) {
        Some(value) => Ok(Some(value)),
        None if required.contains(&key) => Err(DecodeError::MissingKey {
            key: key.to_string(),
        }),
        None => Ok(None),
    }
}

fn expect_bool(key: &str, value: &Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| DecodeError::Shape {
        key: key.to_string(),
        expected: "boolean".to_string(),
        found: type_name(value).to_string(),
    })
}

fn decode_string_list(key: &str, value: &Value) -> Result<Vec<String>> {
    let items = value.as_array().ok_or_else(|| DecodeError::Shape {
        key: key.to_string(),
        expected: "sequence".to_string(),
        found: type_name(value).to_string(),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| DecodeError::Shape {
                    key: format!("{}[{}]", key, index),
                    expected: "string".to_string(),
                    found: type_name(item).to_string(),
                })
        })
        .collect()
}

fn decode_mismatches(value: &Value) -> Result<Vec<Diagnostic>> {
    let entries = value.as_array().ok_or_else(|| DecodeError::Shape {
        key: MISMATCHES_KEY.to_string(),
        expected: "sequence".to_string(),
        found: type_name(value).to_string(),
    })?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| decode_mismatch(index, entry))
        .collect()
}

fn decode_mismatch(index: usize, entry: &Value) -> Result<Diagnostic> {
    let entry = entry.as_object().ok_or_else(|| DecodeError::MalformedEntry {
        key: MISMATCHES_KEY.to_string(),
        index,
        field: RESULT_KEY.to_string(),
        reason: format!("expected mapping, found {}", type_name(entry)),
    })?;

    let string_field = |field: &str| -> Result<String> {
        match entry.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(DecodeError::MalformedEntry {
                key: MISMATCHES_KEY.to_string(),
                index,
                field: field.to_string(),
                reason: format!("expected string, found {}", type_name(other)),
            }),
            None => Err(DecodeError::MalformedEntry {
                key: MISMATCHES_KEY.to_string(),
                index,
                field: field.to_string(),
                reason: "missing".to_string(),
            }),
        }
    };

    Ok(Diagnostic {
        field: string_field(FIELD_KEY)?,
        expected: string_field(EXPECTED_KEY)?,
        actual: string_field(ACTUAL_KEY)?,
        hint: string_field(HINT_KEY)?,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
