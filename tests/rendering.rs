//! Integration tests for rendering semantics

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use serde_json::json;

use stache::{render, TemplateRepository};

#[test]
fn test_interpolation_forms() {
    let html = render("{{amp}} {{{amp}}} {{&amp}}", &json!({"amp": "M&M"}))
        .expect("Should render");
    assert_eq!(html, "M&amp;M M&M M&M");
}

#[test]
fn test_escape_set() {
    let html = render("{{x}}", &json!({"x": "<a href=\"?q='1'\">&</a>"}))
        .expect("Should render");
    assert_eq!(html, "&lt;a href=&quot;?q=&#39;1&#39;&quot;&gt;&amp;&lt;/a&gt;");
}

#[test]
fn test_missing_variable_renders_empty() {
    let html = render("[{{gone}}]", &json!({})).expect("Should render");
    assert_eq!(html, "[]");
}

#[test]
fn test_dotted_keys() {
    let html = render(
        "{{user.name.first}}[{{user.missing.x}}]",
        &json!({"user": {"name": {"first": "Ada"}}}),
    )
    .expect("Should render");
    assert_eq!(html, "Ada[]");
}

#[test]
fn test_dotted_key_anchors_at_nearest_frame() {
    // `a` in the section frame shadows the outer `a` completely; a.b
    // does not fall back to the outer frame once `a` is found.
    let data = json!({
        "a": {"b": "outer"},
        "wrap": {"a": {"c": "inner"}},
    });
    let html = render("{{#wrap}}[{{a.b}}|{{a.c}}]{{/wrap}}", &data).expect("Should render");
    assert_eq!(html, "[|inner]");
}

#[test]
fn test_section_iterates_arrays() {
    let html = render(
        "{{#people}}{{name}};{{/people}}",
        &json!({"people": [{"name": "Ada"}, {"name": "Bob"}]}),
    )
    .expect("Should render");
    assert_eq!(html, "Ada;Bob;");
}

#[test]
fn test_implicit_iterator() {
    let html = render("{{#nums}}{{.}},{{/nums}}", &json!({"nums": [1, 2, 3]}))
        .expect("Should render");
    assert_eq!(html, "1,2,3,");
}

#[test]
fn test_section_pushes_single_object() {
    let html = render(
        "{{#user}}{{name}} ({{role}}){{/user}}",
        &json!({"user": {"name": "Ada"}, "role": "admin"}),
    )
    .expect("Should render");
    assert_eq!(html, "Ada (admin)");
}

#[test]
fn test_falsiness() {
    // Empty string, empty array, false, null, and absent keys skip the
    // section; zero and empty objects do not.
    let data = json!({"zero": 0, "empty": "", "none": [], "off": false, "nil": null, "obj": {}});
    let html = render(
        "{{#zero}}Z{{/zero}}{{#empty}}E{{/empty}}{{#none}}N{{/none}}\
         {{#off}}F{{/off}}{{#nil}}X{{/nil}}{{#obj}}O{{/obj}}{{#gone}}G{{/gone}}",
        &data,
    )
    .expect("Should render");
    assert_eq!(html, "ZO");
}

#[test]
fn test_inverted_sections() {
    let html = render(
        "{{^items}}no items{{/items}}{{^user}}anonymous{{/user}}",
        &json!({"items": [], "user": {"name": "x"}}),
    )
    .expect("Should render");
    assert_eq!(html, "no items");
}

#[test]
fn test_set_delimiters() {
    let html = render("{{=<% %>=}}<%name%> and {{name}}", &json!({"name": "X"}))
        .expect("Should render");
    assert_eq!(html, "X and {{name}}");
}

#[test]
fn test_comment_removed() {
    let html = render("before{{! note }}after", &json!({})).expect("Should render");
    assert_eq!(html, "beforeafter");

    let html = render("a\n  {{! gone }}  \nb", &json!({})).expect("Should render");
    assert_eq!(html, "a\nb");
}

#[test]
fn test_standalone_section_lines_leave_no_blanks() {
    let html = render(
        "Shown:\n{{#items}}\n  - {{.}}\n{{/items}}\nDone.\n",
        &json!({"items": ["a", "b"]}),
    )
    .expect("Should render");
    assert_eq!(html, "Shown:\n  - a\n  - b\nDone.\n");
}

#[test]
fn test_partial_indentation_applies_to_every_line() {
    let mut repository = TemplateRepository::with_partials(HashMap::from([
        ("doc".to_string(), "items:\n  {{>list}}\ntail\n".to_string()),
        ("list".to_string(), "one\ntwo\n".to_string()),
    ]));
    let template = repository.template("doc").expect("Should resolve");
    let html = template.render(&json!({})).expect("Should render");
    assert_eq!(html, "items:\n  one\n  two\ntail\n");
}

#[test]
fn test_number_and_bool_formatting() {
    let html = render(
        "{{n}} {{f}} {{t}} {{missing}}|",
        &json!({"n": 42, "f": 1.5, "t": true}),
    )
    .expect("Should render");
    insta::assert_snapshot!(html, @"42 1.5 true |");
}

#[test]
fn test_composite_values_render_as_json() {
    let html = render("{{{list}}} {{{obj}}}", &json!({"list": [1, 2], "obj": {"k": "v"}}))
        .expect("Should render");
    insta::assert_snapshot!(html, @r#"[1,2] {"k":"v"}"#);
}
