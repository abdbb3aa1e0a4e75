//! Filesystem-backed data source

use std::fs;
use std::io;
use std::path::PathBuf;

use super::{file_name, normalize, DataSource, SourceError, TemplateId, DEFAULT_EXTENSION};

/// Reads template files under a root directory
///
/// A referenced name (which may contain `/` separators) is resolved
/// relative to the directory of the referencing template, or the root for
/// top-level lookups, then the extension is appended. Identifiers are
/// normalized paths, so `item` and `sub/../item` referenced from the same
/// directory share one cached template.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extension: String,
}

impl DirectorySource {
    /// Source reading `.mustache` files under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Use a different file extension; empty appends none
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

impl DataSource for DirectorySource {
    fn template_id(&self, name: &str, base: Option<&TemplateId>) -> Option<TemplateId> {
        let dir = match base {
            Some(TemplateId::Path(path)) => path.parent()?.to_path_buf(),
            _ => self.root.clone(),
        };
        let path = dir.join(file_name(name, &self.extension));
        Some(TemplateId::Path(normalize(&path)))
    }

    fn content(&self, id: &TemplateId) -> Result<String, SourceError> {
        let TemplateId::Path(path) = id else {
            return Err(SourceError::NotFound);
        };
        fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound,
            _ => SourceError::Io(e),
        })
    }
}
