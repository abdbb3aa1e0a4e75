//! Data sources: pluggable backends mapping names to identifiers and
//! identifiers to raw template text

mod directory;
mod embedded;
mod memory;

pub use directory::DirectorySource;
pub use embedded::EmbeddedSource;
pub use memory::MemorySource;

use std::fmt;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// File extension adapters append when none is configured
const DEFAULT_EXTENSION: &str = "mustache";

/// Backend-defined identifier for a template's source location
///
/// Identifiers are the artifact-cache and cycle-guard key: two references
/// resolving to equal identifiers share one compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateId {
    /// Hierarchical location, filesystem or embedded path
    Path(PathBuf),
    /// Flat key in a name-to-text map
    Name(String),
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateId::Path(path) => write!(f, "{}", path.display()),
            TemplateId::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Failure loading content for an identifier
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source has no content for the identifier; the repository turns
    /// this into a not-found error naming the identifier
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// A pluggable backing store for template text
///
/// `template_id` resolves a referenced name against the identifier of the
/// enclosing template (`None` for top-level lookups and raw-string
/// origins); hierarchical backends resolve relative to it, and fall back
/// to their root when it is absent. `content` loads the raw text for a
/// resolved identifier.
pub trait DataSource: Send + Sync {
    fn template_id(&self, name: &str, base: Option<&TemplateId>) -> Option<TemplateId>;
    fn content(&self, id: &TemplateId) -> Result<String, SourceError>;
}

/// `name` with the adapter's extension appended
fn file_name(name: &str, extension: &str) -> String {
    if extension.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", name, extension)
    }
}

/// Fold `.` and `..` components without touching the filesystem, so
/// equivalent references produce equal identifiers
fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().map(|c| c.as_os_str()).collect()
}
