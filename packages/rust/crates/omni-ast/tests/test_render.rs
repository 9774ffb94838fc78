//! Tests for element rendering.

use omni_ast::{MarkupTree, QuoteStyle, RenderOptions, render_element};
use omni_types::{ElementSpec, StyleProperty};

#[test]
fn test_render_leaf() {
    let spec = ElementSpec::new("button")
        .with_attribute("type", "button")
        .with_class("btn")
        .with_class("btn-primary")
        .with_style("background-color", "red")
        .with_text("Go");
    let markup = render_element(&spec, "", &RenderOptions::default());
    assert_eq!(
        markup,
        r#"<button type="button" className="btn btn-primary" style={{ backgroundColor: "red" }}>Go</button>"#
    );
}

#[test]
fn test_render_self_closing() {
    let spec = ElementSpec::new("img").with_attribute("src", "/logo.png");
    assert_eq!(
        render_element(&spec, "    ", &RenderOptions::default()),
        r#"<img src="/logo.png" />"#
    );
}

#[test]
fn test_render_nested_indents_children() {
    let spec = ElementSpec::new("ul")
        .with_child(ElementSpec::new("li").with_text("one"))
        .with_child(ElementSpec::new("li").with_text("two"));
    let options = RenderOptions {
        quote: QuoteStyle::Single,
        indent_unit: "  ".to_string(),
    };
    assert_eq!(
        render_element(&spec, "    ", &options),
        "<ul>\n      <li>one</li>\n      <li>two</li>\n    </ul>"
    );
}

#[test]
fn test_render_single_quotes_and_removed_styles() {
    let mut spec = ElementSpec::new("div").with_style("padding", "8px");
    spec.styles.push(StyleProperty::remove("margin"));
    let options = RenderOptions {
        quote: QuoteStyle::Single,
        indent_unit: "\t".to_string(),
    };
    assert_eq!(
        render_element(&spec, "", &options),
        "<div style={{ padding: '8px' }} />"
    );
}

#[test]
fn test_render_verbatim_markup() {
    let spec = ElementSpec::verbatim("<Card\n  title=\"x\" />");
    assert_eq!(
        render_element(&spec, "  ", &RenderOptions::default()),
        "<Card\n  title=\"x\" />"
    );
}

#[test]
fn test_rendered_markup_parses() {
    let spec = ElementSpec::new("section")
        .with_attribute("aria-label", "say \"hi\"")
        .with_text("{braces} & <tags>")
        .with_child(ElementSpec::new("span").with_text("x"));
    let markup = render_element(&spec, "", &RenderOptions::default());
    let source = format!("const s = (\n{markup}\n);\n");
    let tree = MarkupTree::parse("s.tsx", source).expect("rendered markup parses");
    assert_eq!(tree.len(), 2);
}
