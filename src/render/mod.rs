//! Rendering of compiled templates onto JSON data

mod context;

pub(crate) use context::ContextStack;

use serde_json::Value;

use context::is_falsey;

use crate::template::Node;

/// Render a node list into `out` against the current context stack
pub(crate) fn render_nodes(nodes: &[Node], stack: &mut ContextStack<'_>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Variable { key, escape } => {
                if let Some(value) = stack.resolve(key) {
                    let text = value_text(value);
                    if *escape {
                        escape_into(&text, out);
                    } else {
                        out.push_str(&text);
                    }
                }
            }
            Node::Section {
                key,
                inverted: false,
                children,
            } => match stack.resolve(key) {
                None => {}
                Some(value) if is_falsey(value) => {}
                Some(Value::Array(items)) => {
                    for item in items {
                        stack.push(item);
                        render_nodes(children, stack, out);
                        stack.pop();
                    }
                }
                Some(value) => {
                    stack.push(value);
                    render_nodes(children, stack, out);
                    stack.pop();
                }
            },
            Node::Section {
                key,
                inverted: true,
                children,
            } => {
                let absent_or_falsey = match stack.resolve(key) {
                    None => true,
                    Some(value) => is_falsey(value),
                };
                if absent_or_falsey {
                    render_nodes(children, stack, out);
                }
            }
            Node::Partial { template, indent } => {
                if indent.is_empty() {
                    render_nodes(template.nodes(), stack, out);
                } else {
                    let mut inner = String::new();
                    render_nodes(template.nodes(), stack, &mut inner);
                    for line in inner.split_inclusive('\n') {
                        out.push_str(indent);
                        out.push_str(line);
                    }
                }
            }
        }
    }
}

/// Text form of an interpolated value
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // Arrays and objects interpolate as compact JSON.
        other => other.to_string(),
    }
}

/// HTML-escape into `out`
fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
