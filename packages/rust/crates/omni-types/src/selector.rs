//! Stable element selectors.
//!
//! Two forms are understood:
//!
//! - source locators, `@src/App.tsx:12:4` or `@12:4`, naming an element by the
//!   start of its opening tag;
//! - compound selectors, `div#root.card[data-oid="x1"]`, matched against any
//!   [`Selectable`] (live nodes or markup elements).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::span::SourceSpan;

/// Selector parse error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector string is empty.
    #[error("Empty selector")]
    Empty,

    /// The selector could not be parsed.
    #[error("Invalid selector '{selector}': {reason}")]
    Invalid {
        /// Offending selector text.
        selector: String,
        /// What went wrong.
        reason: String,
    },
}

/// Anything a selector can be matched against.
pub trait Selectable {
    /// Tag name (`div`, `Button`, ...).
    fn tag_name(&self) -> &str;

    /// Literal value of an attribute, if present. `class` must resolve to the
    /// class list whatever the attribute is called in the underlying model.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Whether the element carries `class` in its class list.
    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }
}

/// One compound selector: optional tag, ids, classes, attribute tests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleSelector {
    /// Tag name, `None` for `*` or when omitted.
    pub tag: Option<String>,
    /// Required `id`.
    pub id: Option<String>,
    /// Required classes.
    pub classes: Vec<String>,
    /// Attribute presence (`None`) or equality (`Some`) tests.
    pub attributes: Vec<(String, Option<String>)>,
}

impl SimpleSelector {
    /// Check whether `subject` matches every part of the selector.
    pub fn matches<S: Selectable + ?Sized>(&self, subject: &S) -> bool {
        if let Some(tag) = &self.tag
            && !tag.eq_ignore_ascii_case(subject.tag_name())
        {
            return false;
        }
        if let Some(id) = &self.id
            && subject.attribute("id") != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| subject.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|(name, expected)| {
            match (subject.attribute(name), expected) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
            }
        })
    }
}

/// Parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Opening-tag position, optionally qualified by file.
    Location {
        /// File the position refers to; `None` means "the file being queried".
        file_path: Option<String>,
        /// Start of the opening tag.
        span: SourceSpan,
    },
    /// Compound CSS-like selector.
    Compound(SimpleSelector),
}

impl Selector {
    /// Build a source locator selector.
    #[must_use]
    pub fn location(file_path: impl Into<String>, span: SourceSpan) -> Self {
        Self::Location {
            file_path: Some(file_path.into()),
            span,
        }
    }

    /// Whether this is a source locator.
    #[must_use]
    pub const fn is_location(&self) -> bool {
        matches!(self, Self::Location { .. })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location {
                file_path: Some(file),
                span,
            } => write!(f, "@{file}:{span}"),
            Self::Location {
                file_path: None,
                span,
            } => write!(f, "@{span}"),
            Self::Compound(simple) => {
                write!(f, "{}", simple.tag.as_deref().unwrap_or("*"))?;
                if let Some(id) = &simple.id {
                    write!(f, "#{id}")?;
                }
                for class in &simple.classes {
                    write!(f, ".{class}")?;
                }
                for (name, value) in &simple.attributes {
                    match value {
                        Some(v) => write!(f, "[{name}=\"{v}\"]")?,
                        None => write!(f, "[{name}]")?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SelectorError::Empty);
        }
        if let Some(rest) = s.strip_prefix('@') {
            return parse_location(s, rest);
        }
        parse_compound(s).map(Self::Compound)
    }
}

fn parse_location(full: &str, rest: &str) -> Result<Selector, SelectorError> {
    let invalid = |reason: &str| SelectorError::Invalid {
        selector: full.to_string(),
        reason: reason.to_string(),
    };
    let mut parts = rest.rsplitn(3, ':');
    let column = parts.next().ok_or_else(|| invalid("missing column"))?;
    let line = parts.next().ok_or_else(|| invalid("missing line"))?;
    let file = parts.next().filter(|f| !f.is_empty()).map(str::to_string);

    let line: u32 = line.parse().map_err(|_| invalid("line is not a number"))?;
    let column: u32 = column.parse().map_err(|_| invalid("column is not a number"))?;
    if line == 0 {
        return Err(invalid("lines are 1-indexed"));
    }
    Ok(Selector::Location {
        file_path: file,
        span: SourceSpan::new(line, column),
    })
}

fn parse_compound(s: &str) -> Result<SimpleSelector, SelectorError> {
    let invalid = |reason: &str| SelectorError::Invalid {
        selector: s.to_string(),
        reason: reason.to_string(),
    };
    if s.contains(char::is_whitespace) && !s.contains('[') {
        return Err(invalid("combinators are not supported"));
    }

    let mut selector = SimpleSelector::default();
    let mut chars = s.char_indices().peekable();

    let tag_end = s.find(['#', '.', '[']).unwrap_or(s.len());
    let tag = &s[..tag_end];
    if !tag.is_empty() && tag != "*" {
        selector.tag = Some(tag.to_string());
    }
    while chars.peek().is_some_and(|(i, _)| *i < tag_end) {
        chars.next();
    }

    while let Some((start, marker)) = chars.next() {
        match marker {
            '#' | '.' => {
                let body_start = start + 1;
                let body_end = s[body_start..]
                    .find(['#', '.', '['])
                    .map_or(s.len(), |i| body_start + i);
                let name = &s[body_start..body_end];
                if name.is_empty() {
                    return Err(invalid("empty id or class"));
                }
                if marker == '#' {
                    selector.id = Some(name.to_string());
                } else {
                    selector.classes.push(name.to_string());
                }
                while chars.peek().is_some_and(|(i, _)| *i < body_end) {
                    chars.next();
                }
            }
            '[' => {
                let close = s[start..]
                    .find(']')
                    .map(|i| start + i)
                    .ok_or_else(|| invalid("unterminated attribute test"))?;
                let body = &s[start + 1..close];
                let (name, value) = match body.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim();
                        let value = value
                            .strip_prefix('"')
                            .and_then(|v| v.strip_suffix('"'))
                            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                            .unwrap_or(value);
                        (name.trim(), Some(value.to_string()))
                    }
                    None => (body.trim(), None),
                };
                if name.is_empty() {
                    return Err(invalid("empty attribute name"));
                }
                selector.attributes.push((name.to_string(), value));
                while chars.peek().is_some_and(|(i, _)| *i <= close) {
                    chars.next();
                }
            }
            _ => return Err(invalid("unexpected character")),
        }
    }

    Ok(selector)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Fake {
        tag: String,
        attrs: HashMap<String, String>,
    }

    impl Selectable for Fake {
        fn tag_name(&self) -> &str {
            &self.tag
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attrs.get(name).map(String::as_str)
        }
    }

    fn fake(tag: &str, attrs: &[(&str, &str)]) -> Fake {
        Fake {
            tag: tag.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_parse_location_with_file() {
        let selector: Selector = "@src/App.tsx:10:4".parse().expect("parse");
        assert_eq!(
            selector,
            Selector::location("src/App.tsx", SourceSpan::new(10, 4))
        );
        assert_eq!(selector.to_string(), "@src/App.tsx:10:4");
    }

    #[test]
    fn test_parse_location_without_file() {
        let selector: Selector = "@3:0".parse().expect("parse");
        assert_eq!(
            selector,
            Selector::Location {
                file_path: None,
                span: SourceSpan::new(3, 0)
            }
        );
    }

    #[test]
    fn test_parse_compound() {
        let selector: Selector = "div#root.card[data-oid=\"a1\"][hidden]".parse().expect("parse");
        let Selector::Compound(simple) = selector else {
            panic!("expected compound selector");
        };
        assert_eq!(simple.tag.as_deref(), Some("div"));
        assert_eq!(simple.id.as_deref(), Some("root"));
        assert_eq!(simple.classes, vec!["card".to_string()]);
        assert_eq!(
            simple.attributes,
            vec![
                ("data-oid".to_string(), Some("a1".to_string())),
                ("hidden".to_string(), None)
            ]
        );
    }

    #[test]
    fn test_matches() {
        let node = fake("div", &[("id", "root"), ("class", "card wide")]);
        let hit: Selector = "#root.wide".parse().expect("parse");
        let miss: Selector = "span#root".parse().expect("parse");
        let Selector::Compound(hit) = hit else { panic!() };
        let Selector::Compound(miss) = miss else { panic!() };
        assert!(hit.matches(&node));
        assert!(!miss.matches(&node));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!("".parse::<Selector>(), Err(SelectorError::Empty));
        assert!("@x:y".parse::<Selector>().is_err());
        assert!("div span".parse::<Selector>().is_err());
        assert!("div[".parse::<Selector>().is_err());
    }
}
