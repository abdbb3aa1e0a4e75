//! In-memory data source

use std::collections::HashMap;

use super::{DataSource, SourceError, TemplateId};

/// Serves templates from a fixed name-to-text map
///
/// The namespace is flat: names are map keys as-is and the base
/// identifier is ignored.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: HashMap<String, String>,
}

impl MemorySource {
    pub fn new(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    /// Add or replace one template
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.templates.insert(name.into(), text.into());
    }
}

impl DataSource for MemorySource {
    fn template_id(&self, name: &str, _base: Option<&TemplateId>) -> Option<TemplateId> {
        self.templates
            .contains_key(name)
            .then(|| TemplateId::Name(name.to_string()))
    }

    fn content(&self, id: &TemplateId) -> Result<String, SourceError> {
        let TemplateId::Name(name) = id else {
            return Err(SourceError::NotFound);
        };
        self.templates.get(name).cloned().ok_or(SourceError::NotFound)
    }
}
