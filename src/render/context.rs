//! Context stack for value lookups during rendering

use serde_json::Value;

use crate::parser::ast::KeyPath;

/// Stack of data frames, innermost context on top
pub(crate) struct ContextStack<'a> {
    frames: Vec<&'a Value>,
}

impl<'a> ContextStack<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { frames: vec![root] }
    }

    pub fn push(&mut self, value: &'a Value) {
        self.frames.push(value);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Resolve a key against the stack, top frame first
    ///
    /// A dotted path anchors at the topmost frame whose object contains
    /// the head segment, then navigates the remaining segments strictly;
    /// once anchored it does not fall back to lower frames.
    pub fn resolve(&self, key: &KeyPath) -> Option<&'a Value> {
        if key.is_this() {
            return self.frames.last().copied();
        }
        let (head, rest) = key.segments().split_first()?;
        for frame in self.frames.iter().rev() {
            if let Some(anchored) = frame.as_object().and_then(|o| o.get(head.as_str())) {
                let mut value = anchored;
                for segment in rest {
                    value = value.as_object()?.get(segment.as_str())?;
                }
                return Some(value);
            }
        }
        None
    }
}

/// Section and inverted-section truthiness
pub(crate) fn is_falsey(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
