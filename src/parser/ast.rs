//! Syntax tree types for parsed Mustache templates

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Parsed node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A dotted lookup path like `a.b.c`, or the implicit iterator `.`
///
/// The implicit iterator is represented by an empty segment list and
/// resolves to the value on top of the context stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath(pub Vec<String>);

impl KeyPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// The `.` path, resolving to the current context value
    pub fn this() -> Self {
        Self(Vec::new())
    }

    pub fn is_this(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_this() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0.join("."))
        }
    }
}

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text between tags
    Text(String),
    /// Interpolation: `{{key}}`, or `{{{key}}}` / `{{&key}}` when `escape` is false
    Variable { key: KeyPath, escape: bool },
    /// Section: `{{#key}}...{{/key}}`, or `{{^key}}...{{/key}}` when inverted
    Section {
        key: KeyPath,
        inverted: bool,
        children: Vec<Spanned<Segment>>,
    },
    /// Partial reference: `{{>name}}`, with the indentation of its standalone line
    Partial { name: String, indent: String },
}
