//! Tag scanner for Mustache template text
//!
//! The scanner is hand-rolled rather than table-driven because the
//! set-delimiter tag (`{{=<% %>=}}`) changes the tag delimiters for the
//! remainder of the input, so the alphabet is not fixed up front. It
//! tracks the active delimiter pair and emits one token per literal text
//! run or tag.

use crate::error::ParseError;
use crate::parser::ast::{Span, Spanned};

const DEFAULT_OPEN: &str = "{{";
const DEFAULT_CLOSE: &str = "}}";

/// One scanned token; keys and names are raw, validated by the tree builder
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal text between tags
    Text(String),
    /// `{{key}}`, `{{{key}}}`, or `{{&key}}`
    Variable { key: String, escape: bool },
    /// `{{#key}}` or `{{^key}}`
    SectionOpen { key: String, inverted: bool },
    /// `{{/key}}`
    SectionClose { key: String },
    /// `{{>name}}`; indentation is filled in by standalone-line trimming
    Partial { name: String, indent: String },
    /// `{{!...}}`, kept only so standalone-line trimming can see it
    Comment,
    /// `{{=<% %>=}}`, already applied by the scanner; kept for trimming
    SetDelimiters,
}

/// Scan template text into a flat token sequence
pub fn tokenize(source: &str) -> Result<Vec<Spanned<Token>>, ParseError> {
    let mut tokens = Vec::new();
    let mut open = DEFAULT_OPEN.to_string();
    let mut close = DEFAULT_CLOSE.to_string();
    let mut pos = 0;

    while pos < source.len() {
        let Some(rel) = source[pos..].find(&open) else {
            tokens.push(Spanned::new(
                Token::Text(source[pos..].to_string()),
                pos..source.len(),
            ));
            break;
        };
        let tag_start = pos + rel;
        if rel > 0 {
            tokens.push(Spanned::new(
                Token::Text(source[pos..tag_start].to_string()),
                pos..tag_start,
            ));
        }

        // Triple mustache is only a thing under the default delimiters;
        // custom delimiters use the & form for unescaped interpolation.
        if open == DEFAULT_OPEN && source[tag_start + 2..].starts_with('{') {
            let content_start = tag_start + 3;
            let Some(crel) = source[content_start..].find("}}}") else {
                return Err(ParseError::UnclosedTag {
                    span: tag_start..source.len(),
                });
            };
            let content_end = content_start + crel;
            let span = tag_start..content_end + 3;
            let key = source[content_start..content_end].trim();
            if key.is_empty() {
                return Err(ParseError::EmptyTag { span });
            }
            tokens.push(Spanned::new(
                Token::Variable {
                    key: key.to_string(),
                    escape: false,
                },
                span,
            ));
            pos = content_end + 3;
            continue;
        }

        let content_start = tag_start + open.len();
        let Some(crel) = source[content_start..].find(&close) else {
            return Err(ParseError::UnclosedTag {
                span: tag_start..source.len(),
            });
        };
        let content_end = content_start + crel;
        let span = tag_start..content_end + close.len();
        pos = content_end + close.len();

        let raw = source[content_start..content_end].trim();
        let token = match raw.chars().next() {
            None => return Err(ParseError::EmptyTag { span }),
            Some('!') => Token::Comment,
            Some('#') => Token::SectionOpen {
                key: sigil_rest(raw, &span)?,
                inverted: false,
            },
            Some('^') => Token::SectionOpen {
                key: sigil_rest(raw, &span)?,
                inverted: true,
            },
            Some('/') => Token::SectionClose {
                key: sigil_rest(raw, &span)?,
            },
            Some('>') => Token::Partial {
                name: sigil_rest(raw, &span)?,
                indent: String::new(),
            },
            Some('&') => Token::Variable {
                key: sigil_rest(raw, &span)?,
                escape: false,
            },
            Some('=') => {
                let (new_open, new_close) = parse_delimiters(raw, &span)?;
                open = new_open;
                close = new_close;
                Token::SetDelimiters
            }
            Some(_) => Token::Variable {
                key: raw.to_string(),
                escape: true,
            },
        };
        tokens.push(Spanned::new(token, span));
    }

    Ok(tokens)
}

/// Tag content after its sigil character, trimmed; must be non-empty
fn sigil_rest(raw: &str, span: &Span) -> Result<String, ParseError> {
    let rest = raw[1..].trim();
    if rest.is_empty() {
        return Err(ParseError::EmptyTag { span: span.clone() });
    }
    Ok(rest.to_string())
}

/// Parse `=<open> <close>=` tag content into a new delimiter pair
fn parse_delimiters(raw: &str, span: &Span) -> Result<(String, String), ParseError> {
    let invalid = || ParseError::InvalidDelimiters { span: span.clone() };
    if raw.len() < 2 || !raw.ends_with('=') {
        return Err(invalid());
    }
    let mut parts = raw[1..raw.len() - 1].split_whitespace();
    let (Some(open), Some(close), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    if open.contains('=') || close.contains('=') {
        return Err(invalid());
    }
    Ok((open.to_string(), close.to_string()))
}
