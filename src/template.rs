//! Compiled templates
//!
//! [`Template`] is the immutable compiled form of one template: a node
//! tree whose partial references were linked when it was built. Linking
//! goes through the [`PartialResolver`] capability rather than a concrete
//! repository type, which keeps the compiler and the repository mutually
//! recursive without merging them, and lets either side be tested with a
//! stub for the other.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::TemplateError;
use crate::parser::ast::{KeyPath, Segment, Spanned};
use crate::render::{render_nodes, ContextStack};
use crate::source::TemplateId;

/// Resolution capability the compiler calls for every partial reference
pub(crate) trait PartialResolver {
    fn resolve_partial(
        &mut self,
        name: &str,
        base: Option<&TemplateId>,
    ) -> Result<Arc<Template>, TemplateError>;
}

/// A compiled, renderable template
#[derive(Debug)]
pub struct Template {
    id: Option<TemplateId>,
    nodes: Vec<Node>,
}

/// One node of the compiled tree
#[derive(Debug)]
pub(crate) enum Node {
    Text(String),
    Variable {
        key: KeyPath,
        escape: bool,
    },
    Section {
        key: KeyPath,
        inverted: bool,
        children: Vec<Node>,
    },
    /// A linked partial: the referenced template's compiled artifact is
    /// shared, not recompiled
    Partial {
        template: Arc<Template>,
        indent: String,
    },
}

impl Template {
    /// Parse `text` and link every partial reference through `resolver`
    ///
    /// `base` is the identifier the text was loaded from; `None` marks a
    /// raw-string origin. Partial names are resolved relative to it.
    pub(crate) fn compile(
        text: &str,
        resolver: &mut dyn PartialResolver,
        base: Option<&TemplateId>,
    ) -> Result<Self, TemplateError> {
        let segments = crate::parser::parse(text).map_err(|source| TemplateError::Parse {
            id: base.cloned(),
            source,
        })?;
        let nodes = link(segments, resolver, base)?;
        Ok(Template {
            id: base.cloned(),
            nodes,
        })
    }

    /// Identifier this template was loaded from, `None` for raw strings
    pub fn id(&self) -> Option<&TemplateId> {
        self.id.as_ref()
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Render with any serializable data
    ///
    /// Fails only if `data` cannot be converted to a template value;
    /// rendering itself is total.
    pub fn render<T: Serialize>(&self, data: &T) -> Result<String, TemplateError> {
        let value = serde_json::to_value(data)?;
        Ok(self.render_value(&value))
    }

    /// Render with an already-built JSON value
    pub fn render_value(&self, data: &Value) -> String {
        let mut out = String::new();
        let mut stack = ContextStack::new(data);
        render_nodes(&self.nodes, &mut stack, &mut out);
        out
    }
}

/// Turn parsed segments into compiled nodes, resolving partials eagerly
///
/// A partial failure is annotated with the enclosing template's
/// identifier, so errors deep in a partial chain report every template
/// they unwound through.
fn link(
    segments: Vec<Spanned<Segment>>,
    resolver: &mut dyn PartialResolver,
    base: Option<&TemplateId>,
) -> Result<Vec<Node>, TemplateError> {
    let mut nodes = Vec::with_capacity(segments.len());
    for segment in segments {
        let node = match segment.node {
            Segment::Text(text) => Node::Text(text),
            Segment::Variable { key, escape } => Node::Variable { key, escape },
            Segment::Section {
                key,
                inverted,
                children,
            } => Node::Section {
                key,
                inverted,
                children: link(children, resolver, base)?,
            },
            Segment::Partial { name, indent } => {
                let template = resolver.resolve_partial(&name, base).map_err(|e| match base {
                    Some(id) => e.in_template(id),
                    None => e,
                })?;
                Node::Partial { template, indent }
            }
        };
        nodes.push(node);
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Hands out pre-compiled templates by name, no repository involved
    struct StubResolver {
        partials: HashMap<String, Arc<Template>>,
        calls: Vec<(String, Option<TemplateId>)>,
    }

    impl StubResolver {
        fn empty() -> Self {
            Self {
                partials: HashMap::new(),
                calls: Vec::new(),
            }
        }

        fn with(name: &str, text: &str) -> Self {
            let mut stub = Self::empty();
            let template =
                Template::compile(text, &mut Self::empty(), None).expect("Should compile");
            stub.partials.insert(name.to_string(), Arc::new(template));
            stub
        }
    }

    impl PartialResolver for StubResolver {
        fn resolve_partial(
            &mut self,
            name: &str,
            base: Option<&TemplateId>,
        ) -> Result<Arc<Template>, TemplateError> {
            self.calls.push((name.to_string(), base.cloned()));
            self.partials
                .get(name)
                .cloned()
                .ok_or_else(|| TemplateError::NotFound {
                    name: name.to_string(),
                })
        }
    }

    #[test]
    fn test_compile_and_render_interpolation() {
        let template = Template::compile("Hello {{name}}!", &mut StubResolver::empty(), None)
            .expect("Should compile");
        assert_eq!(
            template.render_value(&json!({"name": "World"})),
            "Hello World!"
        );
    }

    #[test]
    fn test_escaped_and_unescaped() {
        let template = Template::compile(
            "{{text}} vs {{{text}}} vs {{&text}}",
            &mut StubResolver::empty(),
            None,
        )
        .expect("Should compile");
        assert_eq!(
            template.render_value(&json!({"text": "<b>"})),
            "&lt;b&gt; vs <b> vs <b>"
        );
    }

    #[test]
    fn test_section_iterates_array() {
        let template = Template::compile(
            "{{#items}}[{{.}}]{{/items}}",
            &mut StubResolver::empty(),
            None,
        )
        .expect("Should compile");
        assert_eq!(
            template.render_value(&json!({"items": ["a", "b"]})),
            "[a][b]"
        );
        assert_eq!(template.render_value(&json!({"items": []})), "");
    }

    #[test]
    fn test_section_pushes_object_context() {
        let template = Template::compile(
            "{{#user}}{{name}}{{/user}}",
            &mut StubResolver::empty(),
            None,
        )
        .expect("Should compile");
        assert_eq!(
            template.render_value(&json!({"user": {"name": "Ada"}})),
            "Ada"
        );
    }

    #[test]
    fn test_inverted_section() {
        let template = Template::compile(
            "{{^items}}empty{{/items}}",
            &mut StubResolver::empty(),
            None,
        )
        .expect("Should compile");
        assert_eq!(template.render_value(&json!({"items": []})), "empty");
        assert_eq!(template.render_value(&json!({})), "empty");
        assert_eq!(template.render_value(&json!({"items": [1]})), "");
    }

    #[test]
    fn test_missing_variable_renders_empty() {
        let template = Template::compile("[{{missing}}]", &mut StubResolver::empty(), None)
            .expect("Should compile");
        assert_eq!(template.render_value(&json!({})), "[]");
    }

    #[test]
    fn test_partial_links_and_renders_in_context() {
        let mut resolver = StubResolver::with("user", "{{name}}");
        let template = Template::compile("Hi {{>user}}!", &mut resolver, None)
            .expect("Should compile");
        assert_eq!(template.render_value(&json!({"name": "Ada"})), "Hi Ada!");
    }

    #[test]
    fn test_partial_resolved_with_enclosing_base() {
        let mut resolver = StubResolver::with("child", "x");
        let base = TemplateId::Name("parent".to_string());
        Template::compile("{{>child}}", &mut resolver, Some(&base)).expect("Should compile");
        assert_eq!(
            resolver.calls,
            vec![("child".to_string(), Some(base))]
        );
    }

    #[test]
    fn test_missing_partial_annotated_with_enclosing_id() {
        let base = TemplateId::Name("parent".to_string());
        let err = Template::compile("{{>ghost}}", &mut StubResolver::empty(), Some(&base))
            .expect_err("Should fail");
        assert_eq!(err.trail(), vec![&base]);
        assert!(matches!(
            err.root(),
            TemplateError::NotFound { name } if name == "ghost"
        ));
    }

    #[test]
    fn test_missing_partial_from_string_origin_unannotated() {
        let err = Template::compile("{{>ghost}}", &mut StubResolver::empty(), None)
            .expect_err("Should fail");
        assert!(err.trail().is_empty());
        assert!(matches!(
            err,
            TemplateError::NotFound { ref name } if name == "ghost"
        ));
    }

    #[test]
    fn test_parse_error_carries_origin_id() {
        let base = TemplateId::Name("broken".to_string());
        let err = Template::compile("{{#a}}", &mut StubResolver::empty(), Some(&base))
            .expect_err("Should fail");
        match err {
            TemplateError::Parse { id, .. } => assert_eq!(id, Some(base)),
            other => panic!("Expected parse error, got {other:?}"),
        }

        let err = Template::compile("{{#a}}", &mut StubResolver::empty(), None)
            .expect_err("Should fail");
        assert!(matches!(err, TemplateError::Parse { id: None, .. }));
    }

    #[test]
    fn test_standalone_partial_indents_every_line() {
        let mut resolver = StubResolver::with("body", "one\ntwo\n");
        let template = Template::compile("start\n  {{>body}}\nend", &mut resolver, None)
            .expect("Should compile");
        assert_eq!(
            template.render_value(&json!({})),
            "start\n  one\n  two\nend"
        );
    }

    #[test]
    fn test_render_accepts_serializable_data() {
        let template = Template::compile("Hello {{name}}!", &mut StubResolver::empty(), None)
            .expect("Should compile");
        let mut data = HashMap::new();
        data.insert("name", "World");
        assert_eq!(template.render(&data).expect("Should render"), "Hello World!");
    }
}
