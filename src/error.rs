//! Error types for template parsing and resolution

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::source::{SourceError, TemplateId};

/// Byte range in template source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unclosed tag")]
    UnclosedTag { span: Span },

    #[error("empty tag")]
    EmptyTag { span: Span },

    #[error("invalid key '{key}'")]
    InvalidKey { key: String, span: Span },

    #[error("invalid set-delimiter tag")]
    InvalidDelimiters { span: Span },

    #[error("unclosed section '{name}'")]
    UnclosedSection { name: String, span: Span },

    #[error("unexpected section close '{name}'")]
    UnexpectedClose { name: String, span: Span },

    #[error("section '{open}' closed by '{found}'")]
    MismatchedClose {
        open: String,
        found: String,
        span: Span,
    },
}

impl ParseError {
    /// Byte range the error points at
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnclosedTag { span }
            | ParseError::EmptyTag { span }
            | ParseError::InvalidKey { span, .. }
            | ParseError::InvalidDelimiters { span }
            | ParseError::UnclosedSection { span, .. }
            | ParseError::UnexpectedClose { span, .. }
            | ParseError::MismatchedClose { span, .. } => span.clone(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.span();
        let label = match self {
            ParseError::UnclosedTag { .. } => "tag is opened here but never closed".to_string(),
            ParseError::EmptyTag { .. } => "tag has no content".to_string(),
            ParseError::InvalidKey { .. } => {
                "keys are dotted paths like 'a.b.c', or '.' for the current value".to_string()
            }
            ParseError::InvalidDelimiters { .. } => {
                "expected two delimiter strings, like {{=<% %>=}}".to_string()
            }
            ParseError::UnclosedSection { name, .. } => {
                format!("section opened here needs a closing {{{{/{}}}}}", name)
            }
            ParseError::UnexpectedClose { .. } => "no section is open here".to_string(),
            ParseError::MismatchedClose { open, .. } => {
                format!("expected {{{{/{}}}}}", open)
            }
        };

        let mut buf = Vec::new();
        Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }
}

/// Error resolving, loading, compiling, or feeding data to a template
#[derive(Error, Debug)]
pub enum TemplateError {
    /// No identifier, or no content, for the given reference
    #[error("template not found: {name}")]
    NotFound { name: String },

    /// A partial chain loops back onto a template already being compiled
    #[error("recursive partial: {}", cycle_text(.cycle))]
    RecursivePartial { cycle: Vec<TemplateId> },

    /// The template text could not be parsed
    #[error("parse error{}: {source}", id_text(.id))]
    Parse {
        id: Option<TemplateId>,
        source: ParseError,
    },

    /// The data source failed while loading template content
    #[error("failed to load template {id}: {cause}")]
    Source { id: TemplateId, cause: SourceError },

    /// Render data that cannot be represented as a template value
    #[error("unrenderable data: {0}")]
    Data(#[from] serde_json::Error),

    /// A failure inside a partial, annotated with the enclosing template
    #[error("{source} (in template {id})")]
    InTemplate {
        id: TemplateId,
        source: Box<TemplateError>,
    },
}

fn cycle_text(cycle: &[TemplateId]) -> String {
    cycle
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn id_text(id: &Option<TemplateId>) -> String {
    match id {
        Some(id) => format!(" in template {}", id),
        None => String::new(),
    }
}

impl TemplateError {
    /// Annotate with the identifier of an enclosing template
    pub(crate) fn in_template(self, id: &TemplateId) -> Self {
        TemplateError::InTemplate {
            id: id.clone(),
            source: Box::new(self),
        }
    }

    /// The error with all enclosing-template annotations unwrapped
    pub fn root(&self) -> &TemplateError {
        match self {
            TemplateError::InTemplate { source, .. } => source.root(),
            other => other,
        }
    }

    /// Identifiers of the enclosing templates, innermost first
    pub fn trail(&self) -> Vec<&TemplateId> {
        let mut trail = Vec::new();
        let mut error = self;
        while let TemplateError::InTemplate { id, source } = error {
            trail.push(id);
            error = source;
        }
        trail.reverse();
        trail
    }
}
