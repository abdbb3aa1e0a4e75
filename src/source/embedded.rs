//! Compile-time embedded data source

use std::path::PathBuf;

use include_dir::Dir;

use super::{file_name, normalize, DataSource, SourceError, TemplateId, DEFAULT_EXTENSION};

/// Serves templates embedded in the binary with `include_dir`
///
/// Identifiers are paths relative to the embedded root. Resolution is the
/// same as [`DirectorySource`](super::DirectorySource), except a
/// reference that escapes the embedded root resolves to absent.
#[derive(Debug, Clone)]
pub struct EmbeddedSource {
    dir: &'static Dir<'static>,
    extension: String,
}

impl EmbeddedSource {
    pub fn new(dir: &'static Dir<'static>) -> Self {
        Self {
            dir,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Use a different file extension; empty appends none
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

impl DataSource for EmbeddedSource {
    fn template_id(&self, name: &str, base: Option<&TemplateId>) -> Option<TemplateId> {
        let dir = match base {
            Some(TemplateId::Path(path)) => path.parent()?.to_path_buf(),
            _ => PathBuf::new(),
        };
        let path = normalize(&dir.join(file_name(name, &self.extension)));
        if path.starts_with("..") {
            return None;
        }
        Some(TemplateId::Path(path))
    }

    fn content(&self, id: &TemplateId) -> Result<String, SourceError> {
        let TemplateId::Path(path) = id else {
            return Err(SourceError::NotFound);
        };
        let file = self.dir.get_file(path).ok_or(SourceError::NotFound)?;
        file.contents_utf8().map(str::to_string).ok_or_else(|| {
            SourceError::Other(format!("template {} is not valid UTF-8", path.display()))
        })
    }
}
