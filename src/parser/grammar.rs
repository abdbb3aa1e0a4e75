//! Token stream to segment tree
//!
//! Two passes over the scanned tokens: standalone-line trimming (a
//! non-interpolation tag alone on its line disappears along with the
//! line), then section-tree building with open/close matching.

use crate::error::ParseError;
use crate::parser::ast::{KeyPath, Segment, Span, Spanned};
use crate::parser::lexer::{self, Token};

/// Parse template text into a segment tree
pub fn parse(source: &str) -> Result<Vec<Spanned<Segment>>, ParseError> {
    let mut tokens = lexer::tokenize(source)?;
    trim_standalone(&mut tokens);
    tokens.retain(|t| !matches!(&t.node, Token::Text(s) if s.is_empty()));
    build_tree(tokens)
}

/// Whether a token may claim a standalone line
fn can_stand_alone(token: &Token) -> bool {
    matches!(
        token,
        Token::SectionOpen { .. }
            | Token::SectionClose { .. }
            | Token::Partial { .. }
            | Token::Comment
            | Token::SetDelimiters
    )
}

fn is_inline_ws(s: &str) -> bool {
    s.bytes().all(|b| b == b' ' || b == b'\t')
}

fn is_line_tail_ws(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r'))
}

/// Remove standalone tag lines and record partial indentation
///
/// Decisions are made against the original text tokens, then all cuts are
/// applied at once; a text token can lose its head to the tag on its left
/// and its tail to the tag on its right, and the two cuts never overlap
/// because they are bounded by the token's first and last newline.
fn trim_standalone(tokens: &mut [Spanned<Token>]) {
    let mut cuts: Vec<(usize, usize)> = tokens
        .iter()
        .map(|t| match &t.node {
            Token::Text(s) => (0, s.len()),
            _ => (0, 0),
        })
        .collect();
    let mut indents: Vec<Option<String>> = vec![None; tokens.len()];

    for i in 0..tokens.len() {
        if !can_stand_alone(&tokens[i].node) {
            continue;
        }

        // Only whitespace between the previous newline (or input start)
        // and the tag.
        let (prev_ok, cut_prev, indent) = if i == 0 {
            (true, None, String::new())
        } else if let Token::Text(t) = &tokens[i - 1].node {
            match t.rfind('\n') {
                Some(nl) => {
                    let tail = &t[nl + 1..];
                    (is_inline_ws(tail), Some(nl + 1), tail.to_string())
                }
                None => (i == 1 && is_inline_ws(t), Some(0), t.clone()),
            }
        } else {
            (false, None, String::new())
        };
        if !prev_ok {
            continue;
        }

        // Only whitespace between the tag and the next newline (or input
        // end).
        let (next_ok, cut_next) = if i + 1 == tokens.len() {
            (true, None)
        } else if let Token::Text(t) = &tokens[i + 1].node {
            match t.find('\n') {
                Some(nl) if is_line_tail_ws(&t[..nl]) => (true, Some(nl + 1)),
                Some(_) => (false, None),
                None => (i + 2 == tokens.len() && is_inline_ws(t), Some(t.len())),
            }
        } else {
            (false, None)
        };
        if !next_ok {
            continue;
        }

        if let Some(c) = cut_prev {
            cuts[i - 1].1 = c;
        }
        if let Some(c) = cut_next {
            cuts[i + 1].0 = c;
        }
        if matches!(tokens[i].node, Token::Partial { .. }) {
            indents[i] = Some(indent);
        }
    }

    for (i, tok) in tokens.iter_mut().enumerate() {
        match &mut tok.node {
            Token::Text(t) => {
                let (start, end) = cuts[i];
                if start > 0 || end < t.len() {
                    *t = t[start..end].to_string();
                }
            }
            Token::Partial { indent, .. } => {
                if let Some(ws) = indents[i].take() {
                    *indent = ws;
                }
            }
            _ => {}
        }
    }
}

/// An open section awaiting its close tag
struct OpenSection {
    key: KeyPath,
    inverted: bool,
    span: Span,
    saved: Vec<Spanned<Segment>>,
}

fn build_tree(tokens: Vec<Spanned<Token>>) -> Result<Vec<Spanned<Segment>>, ParseError> {
    let mut stack: Vec<OpenSection> = Vec::new();
    let mut current: Vec<Spanned<Segment>> = Vec::new();

    for Spanned { node, span } in tokens {
        match node {
            Token::Text(t) => current.push(Spanned::new(Segment::Text(t), span)),
            Token::Variable { key, escape } => {
                let key = parse_key(&key, &span)?;
                current.push(Spanned::new(Segment::Variable { key, escape }, span));
            }
            Token::SectionOpen { key, inverted } => {
                let key = parse_key(&key, &span)?;
                stack.push(OpenSection {
                    key,
                    inverted,
                    span,
                    saved: std::mem::take(&mut current),
                });
            }
            Token::SectionClose { key } => {
                let close_key = parse_key(&key, &span)?;
                let Some(open) = stack.pop() else {
                    return Err(ParseError::UnexpectedClose {
                        name: close_key.to_string(),
                        span,
                    });
                };
                if open.key != close_key {
                    return Err(ParseError::MismatchedClose {
                        open: open.key.to_string(),
                        found: close_key.to_string(),
                        span,
                    });
                }
                let children = std::mem::replace(&mut current, open.saved);
                current.push(Spanned::new(
                    Segment::Section {
                        key: open.key,
                        inverted: open.inverted,
                        children,
                    },
                    open.span.start..span.end,
                ));
            }
            Token::Partial { name, indent } => {
                current.push(Spanned::new(Segment::Partial { name, indent }, span));
            }
            Token::Comment | Token::SetDelimiters => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::UnclosedSection {
            name: open.key.to_string(),
            span: open.span,
        });
    }
    Ok(current)
}

/// Validate a raw tag key as a dotted path or the implicit iterator
fn parse_key(raw: &str, span: &Span) -> Result<KeyPath, ParseError> {
    if raw == "." {
        return Ok(KeyPath::this());
    }
    let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
    if segments
        .iter()
        .any(|s| s.is_empty() || s.chars().any(char::is_whitespace))
    {
        return Err(ParseError::InvalidKey {
            key: raw.to_string(),
            span: span.clone(),
        });
    }
    Ok(KeyPath::new(segments))
}
