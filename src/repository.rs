//! Template repository: named lookup, artifact caching, cycle detection
//!
//! A [`TemplateRepository`] turns a template name (or a raw template
//! string) into a compiled [`Template`], loading text through a pluggable
//! [`DataSource`] and linking every partial reference from the same
//! source. Resolution of one name runs in three layers:
//!
//! 1. the source maps `(name, base identifier)` to an identifier, with
//!    hierarchical sources resolving relative to the referencing
//!    template; successful mappings are memoized so later lookups of a
//!    cached template never touch the source again;
//! 2. the artifact cache returns the already-compiled template for a
//!    known identifier, so every identifier is compiled at most once per
//!    repository and all references share one artifact;
//! 3. otherwise the text is loaded and compiled, with the identifier held
//!    on a resolution stack for the duration, which is what turns a
//!    self- or mutually-referential partial chain into a
//!    [`TemplateError::RecursivePartial`] instead of infinite recursion.
//!
//! Failures never leave partial state behind: the cache only ever
//! receives fully-compiled templates, and the stack is restored on every
//! exit path, so retrying after fixing the underlying cause behaves like
//! a first call. Caches are kept for the repository's whole lifetime;
//! there is no eviction.
//!
//! The resolving entry points take `&mut self`, which serializes
//! resolution per repository; wrap the repository in a `Mutex` to share
//! it across threads.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use include_dir::Dir;
use tracing::{debug, trace};

use crate::error::TemplateError;
use crate::source::{
    DataSource, DirectorySource, EmbeddedSource, MemorySource, SourceError, TemplateId,
};
use crate::template::{PartialResolver, Template};

pub struct TemplateRepository {
    /// Shared, swappable handle; read once at the start of each
    /// resolution and used for the whole chain
    source: Option<Arc<dyn DataSource>>,
    /// Compiled artifacts by identifier; insertion only on success
    templates: HashMap<TemplateId, Arc<Template>>,
    /// Memo of successful name resolutions; failures are never recorded
    ids: HashMap<(String, Option<TemplateId>), TemplateId>,
    /// Identifiers being compiled on the active call chain, outermost
    /// first; empty between top-level calls
    stack: Vec<TemplateId>,
}

impl TemplateRepository {
    /// Repository with no data source
    ///
    /// Raw strings without partial references still compile; any partial
    /// reference fails with [`TemplateError::NotFound`].
    pub fn new() -> Self {
        Self {
            source: None,
            templates: HashMap::new(),
            ids: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Repository reading from the given data source
    pub fn with_source(source: impl DataSource + 'static) -> Self {
        let mut repository = Self::new();
        repository.source = Some(Arc::new(source));
        repository
    }

    /// Repository reading `.mustache` files under `root`
    pub fn with_directory(root: impl Into<PathBuf>) -> Self {
        Self::with_source(DirectorySource::new(root))
    }

    /// Repository serving a fixed name-to-text map
    pub fn with_partials(partials: HashMap<String, String>) -> Self {
        Self::with_source(MemorySource::new(partials))
    }

    /// Repository reading `.mustache` templates embedded at compile time
    pub fn with_embedded(dir: &'static Dir<'static>) -> Self {
        Self::with_source(EmbeddedSource::new(dir))
    }

    /// The data source handle currently in use
    pub fn source(&self) -> Option<Arc<dyn DataSource>> {
        self.source.clone()
    }

    /// Swap the data source
    ///
    /// Cached artifacts and memoized name resolutions are kept; a
    /// repository caches for its whole lifetime. Use a fresh repository
    /// for templates that should not be served from cache.
    pub fn set_source(&mut self, source: Option<Arc<dyn DataSource>>) {
        self.source = source;
    }

    /// Resolve a template by name
    pub fn template(&mut self, name: &str) -> Result<Arc<Template>, TemplateError> {
        self.resolve(name, None)
    }

    /// Compile a raw template string
    ///
    /// The result is not cached (it has no identifier). Partial
    /// references inside it resolve through the data source with no base
    /// identifier, the same as top-level named lookups.
    pub fn template_from_str(&mut self, text: &str) -> Result<Arc<Template>, TemplateError> {
        Template::compile(text, self, None).map(Arc::new)
    }

    /// The single resolution chokepoint, for both top-level lookups and
    /// partial references encountered mid-compilation
    fn resolve(
        &mut self,
        name: &str,
        base: Option<&TemplateId>,
    ) -> Result<Arc<Template>, TemplateError> {
        let Some(source) = self.source.clone() else {
            return Err(TemplateError::NotFound {
                name: name.to_string(),
            });
        };

        let key = (name.to_string(), base.cloned());
        let id = match self.ids.get(&key) {
            Some(id) => id.clone(),
            None => {
                let Some(id) = source.template_id(name, base) else {
                    return Err(TemplateError::NotFound {
                        name: name.to_string(),
                    });
                };
                self.ids.insert(key, id.clone());
                id
            }
        };

        if let Some(template) = self.templates.get(&id) {
            trace!("cache hit for template {}", id);
            return Ok(Arc::clone(template));
        }

        // Cycle guard, before any content is loaded.
        if let Some(first) = self.stack.iter().position(|pending| pending == &id) {
            let mut cycle = self.stack[first..].to_vec();
            cycle.push(id);
            return Err(TemplateError::RecursivePartial { cycle });
        }

        // The pop is unconditional, so a failed chain leaves the stack
        // exactly as it found it.
        debug!("compiling template {}", id);
        self.stack.push(id.clone());
        let result = self.load_and_compile(&source, &id);
        self.stack.pop();

        let template = Arc::new(result?);
        trace!("caching template {}", id);
        self.templates.insert(id, Arc::clone(&template));
        Ok(template)
    }

    fn load_and_compile(
        &mut self,
        source: &Arc<dyn DataSource>,
        id: &TemplateId,
    ) -> Result<Template, TemplateError> {
        let text = source.content(id).map_err(|e| match e {
            SourceError::NotFound => TemplateError::NotFound {
                name: id.to_string(),
            },
            cause => TemplateError::Source {
                id: id.clone(),
                cause,
            },
        })?;
        Template::compile(&text, self, Some(id))
    }
}

impl PartialResolver for TemplateRepository {
    fn resolve_partial(
        &mut self,
        name: &str,
        base: Option<&TemplateId>,
    ) -> Result<Arc<Template>, TemplateError> {
        self.resolve(name, base)
    }
}

impl Default for TemplateRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TemplateRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRepository")
            .field("has_source", &self.source.is_some())
            .field("cached", &self.templates.len())
            .field("resolving", &self.stack)
            .finish()
    }
}
