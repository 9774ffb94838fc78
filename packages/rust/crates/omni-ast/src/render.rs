//! Rendering of element specs to JSX source.

use omni_types::{ElementSpec, StyleProperty};
use serde::{Deserialize, Serialize};

/// Quote character used for generated string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// `"value"`
    #[default]
    Double,
    /// `'value'`
    Single,
}

impl QuoteStyle {
    /// The quote character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }

    /// Quote `value`, escaping backslashes and the quote character.
    #[must_use]
    pub fn quote(self, value: &str) -> String {
        let q = self.as_char();
        let mut out = String::with_capacity(value.len() + 2);
        out.push(q);
        for c in value.chars() {
            if c == q || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push(q);
        out
    }
}

/// Formatting knobs for generated markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Quote style for attribute and style values.
    pub quote: QuoteStyle,
    /// One level of indentation.
    pub indent_unit: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            quote: QuoteStyle::Double,
            indent_unit: "  ".to_string(),
        }
    }
}

/// Render `spec` as JSX.
///
/// The first line carries no indentation; continuation lines are prefixed
/// with `indent`. Specs carrying verbatim `markup` are returned unchanged.
#[must_use]
pub fn render_element(spec: &ElementSpec, indent: &str, options: &RenderOptions) -> String {
    let mut out = String::new();
    render_into(spec, indent, options, &mut out);
    out
}

fn render_into(spec: &ElementSpec, indent: &str, options: &RenderOptions, out: &mut String) {
    if let Some(markup) = &spec.markup {
        out.push_str(markup);
        return;
    }

    out.push('<');
    out.push_str(&spec.tag_name);
    for (name, value) in &spec.attributes {
        out.push(' ');
        out.push_str(name);
        out.push('=');
        out.push_str(&attribute_value(value, options.quote));
    }
    if !spec.class_names.is_empty() {
        out.push_str(" className=");
        out.push_str(&attribute_value(&spec.class_names.join(" "), options.quote));
    }
    let styles: Vec<&StyleProperty> = spec.styles.iter().filter(|s| s.value.is_some()).collect();
    if !styles.is_empty() {
        let entries: Vec<String> = styles
            .iter()
            .filter_map(|s| {
                let value = s.value.as_deref()?;
                Some(format!("{}: {}", style_key(&s.name), style_value(value, options.quote)))
            })
            .collect();
        out.push_str(" style={{ ");
        out.push_str(&entries.join(", "));
        out.push_str(" }}");
    }

    let text = spec.text_content.as_deref().filter(|t| !t.is_empty());
    match (text, spec.children.is_empty()) {
        (None, true) => out.push_str(" />"),
        (Some(text), true) => {
            out.push('>');
            out.push_str(&escape_text(text));
            push_close(&spec.tag_name, out);
        }
        (text, false) => {
            out.push('>');
            let inner = format!("{indent}{}", options.indent_unit);
            if let Some(text) = text {
                out.push('\n');
                out.push_str(&inner);
                out.push_str(&escape_text(text));
            }
            for child in &spec.children {
                out.push('\n');
                out.push_str(&inner);
                render_into(child, &inner, options, out);
            }
            out.push('\n');
            out.push_str(indent);
            push_close(&spec.tag_name, out);
        }
    }
}

fn push_close(tag: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Attribute value as JSX: a quoted literal, or a string expression when the
/// value contains the quote character.
#[must_use]
pub fn attribute_value(value: &str, quote: QuoteStyle) -> String {
    if value.contains(quote.as_char()) || value.contains('\n') {
        format!("{{{}}}", serde_json::Value::from(value))
    } else {
        format!("{q}{value}{q}", q = quote.as_char())
    }
}

/// Text as JSX content; characters JSX treats specially force a string
/// expression.
#[must_use]
pub fn escape_text(text: &str) -> String {
    if text.contains(['{', '}', '<', '>']) {
        format!("{{{}}}", serde_json::Value::from(text))
    } else {
        text.to_string()
    }
}

/// CSS property name as a React style key (`background-color` → `backgroundColor`).
///
/// Custom properties (`--x`) are kept as written.
#[must_use]
pub fn camel_case(name: &str) -> String {
    if name.starts_with("--") || !name.contains('-') {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name.split('-').enumerate() {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if i > 0 => {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
            Some(_) => out.push_str(segment),
            None => {}
        }
    }
    out
}

/// Object key for a style property, quoted when not a plain identifier.
#[must_use]
pub fn style_key(name: &str) -> String {
    let key = camel_case(name);
    let is_ident = key
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if is_ident { key } else { format!("'{key}'") }
}

/// Style value as a JS literal: bare numbers stay numeric.
#[must_use]
pub fn style_value(value: &str, quote: QuoteStyle) -> String {
    let numeric = !value.is_empty()
        && !value.starts_with('.')
        && !value.ends_with('.')
        && value.parse::<f64>().is_ok_and(f64::is_finite)
        && value.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-');
    if numeric {
        value.to_string()
    } else {
        quote.quote(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("background-color"), "backgroundColor");
        assert_eq!(camel_case("color"), "color");
        assert_eq!(camel_case("-webkit-transition"), "WebkitTransition");
        assert_eq!(camel_case("--brand"), "--brand");
    }

    #[test]
    fn test_style_key_quotes_custom_properties() {
        assert_eq!(style_key("margin-top"), "marginTop");
        assert_eq!(style_key("--brand"), "'--brand'");
    }

    #[test]
    fn test_style_value() {
        assert_eq!(style_value("12", QuoteStyle::Single), "12");
        assert_eq!(style_value("0.5", QuoteStyle::Single), "0.5");
        assert_eq!(style_value("12px", QuoteStyle::Single), "'12px'");
        assert_eq!(style_value("it's", QuoteStyle::Single), "'it\\'s'");
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("Hello"), "Hello");
        assert_eq!(escape_text("a < b"), "{\"a < b\"}");
    }
}
