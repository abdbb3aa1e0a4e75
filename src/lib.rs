//! Stache - a Mustache template repository
//!
//! This library loads, compiles, and caches Mustache templates. A
//! [`TemplateRepository`] resolves template names through a pluggable
//! [`DataSource`], links `{{>partial}}` references when it compiles, and
//! hands back shared [`Template`] artifacts that render any
//! [`serde::Serialize`] data.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! let mut repository = stache::TemplateRepository::with_partials(HashMap::from([
//!     ("page".to_string(), "{{>header}} {{body}}".to_string()),
//!     ("header".to_string(), "<h1>{{title}}</h1>".to_string()),
//! ]));
//!
//! let template = repository.template("page").unwrap();
//! let html = template
//!     .render(&HashMap::from([("title", "Home"), ("body", "Welcome!")]))
//!     .unwrap();
//! assert_eq!(html, "<h1>Home</h1> Welcome!");
//! ```

pub mod error;
pub mod parser;
mod render;
pub mod repository;
pub mod source;
pub mod template;

pub use error::{ParseError, TemplateError};
pub use repository::TemplateRepository;
pub use source::{
    DataSource, DirectorySource, EmbeddedSource, MemorySource, SourceError, TemplateId,
};
pub use template::Template;

use std::path::Path;

use serde::Serialize;

/// Render a template string in one shot
///
/// Convenience around a sourceless [`TemplateRepository`]; the template
/// cannot reference partials. `data` is anything [`serde::Serialize`].
///
/// # Example
///
/// ```rust
/// use serde_json::json;
///
/// let html = stache::render("Hello {{name}}!", &json!({"name": "World"})).unwrap();
/// assert_eq!(html, "Hello World!");
/// ```
pub fn render<T: Serialize>(template: &str, data: &T) -> Result<String, TemplateError> {
    let mut repository = TemplateRepository::new();
    let template = repository.template_from_str(template)?;
    template.render(data)
}

/// Render a template file, resolving partials beside it
///
/// Builds a [`TemplateRepository`] rooted at the file's directory and
/// using the file's own extension, so `{{>name}}` references load
/// sibling files.
///
/// # Example
///
/// ```rust,no_run
/// use serde_json::json;
///
/// let html = stache::render_file("templates/page.mustache", &json!({"title": "Home"})).unwrap();
/// ```
pub fn render_file<T: Serialize>(
    path: impl AsRef<Path>,
    data: &T,
) -> Result<String, TemplateError> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| TemplateError::NotFound {
            name: path.display().to_string(),
        })?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    let mut repository =
        TemplateRepository::with_source(DirectorySource::new(root).with_extension(extension));
    let template = repository.template(name)?;
    template.render(data)
}
