//! Template parsing
//!
//! Placeholder syntax:
//!
//! ```text
//! {{ field }}            JSON-encoded value (strings become quoted literals)
//! {{ owner.name }}       nested field lookup
//! {{ field | json }}     same as the default, spelled out
//! {{ field | raw }}      strings inserted verbatim, everything else as JSON
//! ```
//!
//! `raw` writes string values into the rule text unescaped. A value holding
//! a quote or a newline can change the meaning of the generated module, so
//! only use it for trusted values such as package names.

use crate::error::{Result, TemplateError};
use serde_json::Value;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// How a placeholder value is written into the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Always JSON-encoded (the default)
    Json,
    /// Strings verbatim and unescaped, other values as JSON
    Raw,
}

/// A `{{ ... }}` occurrence in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub path: Vec<String>,
    pub filter: Filter,
    pub line: usize,
}

impl Placeholder {
    /// Dotted field path as written in the template
    pub fn field(&self) -> String {
        self.path.join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Placeholder(Placeholder),
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    id: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(id: impl Into<String>, source: &str) -> Result<Self> {
        let id = id.into();
        let mut segments = Vec::new();
        let mut rest = source;
        let mut line = 1;

        while let Some(start) = rest.find(OPEN) {
            let (text, after_text) = rest.split_at(start);
            if !text.is_empty() {
                segments.push(Segment::Text(text.to_string()));
            }
            line += text.matches('\n').count();

            let body_start = &after_text[OPEN.len()..];
            let end = body_start.find(CLOSE).ok_or_else(|| TemplateError::Parse {
                template: id.clone(),
                line,
                message: "unterminated placeholder".to_string(),
            })?;

            let body = &body_start[..end];
            segments.push(Segment::Placeholder(parse_placeholder(&id, body, line)?));
            line += body.matches('\n').count();

            rest = &body_start[end + CLOSE.len()..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { id, segments })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholders in order of appearance
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) => Some(p),
            Segment::Text(_) => None,
        })
    }

    /// Render against a context value
    ///
    /// Every placeholder must resolve; an unresolved path is an error rather
    /// than an empty substitution.
    pub fn render(&self, context: &Value) -> Result<String> {
        let mut output = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Placeholder(placeholder) => {
                    let value = resolve(context, &placeholder.path).ok_or_else(|| {
                        TemplateError::MissingField {
                            template: self.id.clone(),
                            field: placeholder.field(),
                        }
                    })?;
                    write_value(&mut output, value, placeholder.filter);
                }
            }
        }

        Ok(output)
    }
}

fn parse_placeholder(template: &str, body: &str, line: usize) -> Result<Placeholder> {
    let error = |message: String| TemplateError::Parse {
        template: template.to_string(),
        line,
        message,
    };

    let mut parts = body.split('|').map(str::trim);
    let path = parts.next().unwrap_or_default();
    if path.is_empty() {
        return Err(error("empty placeholder".to_string()));
    }

    let filter = match parts.next() {
        None | Some("json") => Filter::Json,
        Some("raw") => Filter::Raw,
        Some(other) => return Err(error(format!("unknown filter '{}'", other))),
    };
    if parts.next().is_some() {
        return Err(error("only one filter is allowed".to_string()));
    }

    let path: Vec<String> = path.split('.').map(str::to_string).collect();
    if let Some(bad) = path.iter().find(|s| !is_field_name(s)) {
        return Err(error(format!("invalid field name '{}'", bad)));
    }

    Ok(Placeholder { path, filter, line })
}

fn is_field_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn resolve<'a>(context: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter()
        .try_fold(context, |current, segment| current.as_object()?.get(segment))
}

fn write_value(output: &mut String, value: &Value, filter: Filter) {
    match (filter, value) {
        (Filter::Raw, Value::String(s)) => output.push_str(s),
        _ => output.push_str(&value.to_string()),
    }
}
