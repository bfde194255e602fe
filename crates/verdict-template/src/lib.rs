//! Verdict Template - rule module generation from templates
//!
//! Templates are rule text with `{{ field }}` placeholders. Rendering is a
//! pure function of the template source and a serializable data record:
//! the same inputs always produce byte-identical output.
//!
//! ```rust
//! use verdict_template::{Renderer, TemplateRegistry};
//!
//! let registry = TemplateRegistry::new()
//!     .with_template("resource", "expected_slug := {{ slug | json }}");
//! let renderer = Renderer::new(registry);
//!
//! let text = renderer
//!     .render_value("resource", &serde_json::json!({"slug": "some_slug"}))
//!     .unwrap();
//! assert_eq!(text, r#"expected_slug := "some_slug""#);
//! ```

pub mod error;
pub mod parser;
pub mod renderer;
pub mod source;

pub use error::{Result, TemplateError};
pub use parser::{Filter, Placeholder, Segment, Template};
pub use renderer::{CacheStats, Renderer};
pub use source::{TemplateRegistry, TemplateSource};
