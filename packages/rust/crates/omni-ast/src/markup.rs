//! Owned element tree for JSX/TSX sources.
//!
//! The ast-grep syntax tree borrows the source it was parsed from, so it is
//! walked once and flattened into an arena of [`Element`]s indexed by
//! [`ElementId`]. Ids follow document order of the opening tags.

use std::path::Path;

use omni_location::LineIndex;
use omni_types::{ByteRange, LocationRecord, Selectable, Selector, SourceSpan, TagRange};

use crate::error::MarkupError;
use crate::lang::Lang;
use crate::re_exports::{LanguageExt, SyntaxNode};

/// Index of an element inside its [`MarkupTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    /// Position in document order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One piece of an element's content, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    /// Nested element written directly between the tags.
    Element(ElementId),
    /// Raw JSX text (may be whitespace only).
    Text(ByteRange),
    /// `{...}` expression container.
    Expression(ByteRange),
}

/// Entry of an object literal (`{ color: 'red', ...base }`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectEntry {
    /// `key: value`
    Property {
        /// Unquoted key.
        key: String,
        /// Whole entry.
        range: ByteRange,
        /// Value expression.
        value: ByteRange,
    },
    /// `...expr`
    Spread {
        /// Whole entry.
        range: ByteRange,
    },
    /// Shorthand, computed keys, methods.
    Other {
        /// Whole entry.
        range: ByteRange,
    },
}

impl ObjectEntry {
    /// Source range of the entry.
    #[must_use]
    pub fn range(&self) -> ByteRange {
        match self {
            Self::Property { range, .. } | Self::Spread { range } | Self::Other { range } => *range,
        }
    }
}

/// Object literal inside an attribute expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLiteral {
    /// Range from `{` to `}`.
    pub range: ByteRange,
    /// Entries in source order.
    pub entries: Vec<ObjectEntry>,
}

/// Attribute value forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// `disabled`
    Bare,
    /// `id="root"`; `value` excludes the quotes.
    Literal {
        /// Range including quotes.
        range: ByteRange,
        /// Unquoted text.
        value: String,
    },
    /// `style={...}`
    Expression {
        /// Range including braces.
        range: ByteRange,
        /// Set when the expression is a plain object literal.
        object: Option<ObjectLiteral>,
    },
    /// `{...props}`
    Spread,
}

/// One attribute of an opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name (`...` for spreads).
    pub name: String,
    /// Whole attribute text.
    pub range: ByteRange,
    /// Parsed value.
    pub value: AttrValue,
}

impl Attribute {
    /// Literal text value; bare attributes read as empty.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        match &self.value {
            AttrValue::Literal { value, .. } => Some(value),
            AttrValue::Bare => Some(""),
            _ => None,
        }
    }
}

/// A JSX element (or fragment, with an empty tag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written.
    pub tag: String,
    /// Offset just past the tag name.
    pub name_end: usize,
    /// Whole element, from `<` to the end of the closing tag.
    pub range: ByteRange,
    /// Opening (or self-closing) tag.
    pub open_tag: ByteRange,
    /// Closing tag, `None` when self-closing.
    pub close_tag: Option<ByteRange>,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    /// Content between the tags.
    pub content: Vec<Content>,
    /// Nearest enclosing element.
    pub parent: Option<ElementId>,
    /// Nested through an expression rather than written as direct content.
    pub embedded: bool,
    /// Number of enclosing elements.
    pub depth: usize,
}

impl Element {
    /// Whether the element has no closing tag.
    #[must_use]
    pub fn is_self_closing(&self) -> bool {
        self.close_tag.is_none()
    }

    /// Whether this is `<>...</>`.
    #[must_use]
    pub fn is_fragment(&self) -> bool {
        self.tag.is_empty()
    }

    /// First attribute called `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Range between the opening and closing tags.
    #[must_use]
    pub fn inner_range(&self) -> Option<ByteRange> {
        self.close_tag
            .map(|close| ByteRange::new(self.open_tag.end, close.start))
    }
}

impl Selectable for Element {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        let name = if name == "class" && Element::attribute(self, "className").is_some() {
            "className"
        } else {
            name
        };
        Element::attribute(self, name).and_then(Attribute::literal)
    }
}

/// Parsed markup of one source file.
#[derive(Debug, Clone)]
pub struct MarkupTree {
    file_path: String,
    lang: Lang,
    source: String,
    lines: LineIndex,
    elements: Vec<Element>,
}

impl MarkupTree {
    /// Parse `source`, picking the grammar from the file extension.
    ///
    /// # Errors
    /// `UnsupportedLanguage` for non-JS/TS files, `Syntax` when the grammar
    /// reports an error or missing node.
    pub fn parse(file_path: impl Into<String>, source: impl Into<String>) -> Result<Self, MarkupError> {
        let file_path = file_path.into();
        let lang = Lang::from_path(Path::new(&file_path))
            .ok_or_else(|| MarkupError::UnsupportedLanguage(file_path.clone()))?;
        Self::parse_as(file_path, source, lang)
    }

    /// Parse `source` with an explicit dialect.
    ///
    /// # Errors
    /// `Syntax` when the grammar reports an error or missing node.
    pub fn parse_as(
        file_path: impl Into<String>,
        source: impl Into<String>,
        lang: Lang,
    ) -> Result<Self, MarkupError> {
        let file_path = file_path.into();
        let source = source.into();
        let lines = LineIndex::new(&source);

        let elements = {
            let grep = lang.support_lang().ast_grep(&source);
            let root = grep.root();
            if let Some(bad) = root.dfs().find(|n| n.is_error() || n.is_missing()) {
                return Err(MarkupError::Syntax {
                    span: lines.span_at(&source, bad.range().start),
                    file_path,
                });
            }
            let mut builder = Builder {
                source: &source,
                elements: Vec::new(),
            };
            builder.visit(&root, None);
            builder.elements
        };

        Ok(Self {
            file_path,
            lang,
            source,
            lines,
            elements,
        })
    }

    /// File this tree was parsed from.
    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Dialect used for parsing.
    #[must_use]
    pub fn lang(&self) -> Lang {
        self.lang
    }

    /// Serialized form: the exact source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Line table of the source.
    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        &self.lines
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the source holds no markup at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element by id.
    ///
    /// # Panics
    /// Panics if `id` belongs to another tree.
    #[must_use]
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// All ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.elements.len()).map(ElementId)
    }

    /// Elements without an enclosing element.
    pub fn roots(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.ids().filter(|id| self.element(*id).parent.is_none())
    }

    /// Elements written directly inside `id`, in order.
    #[must_use]
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.element(id)
            .content
            .iter()
            .filter_map(|c| match c {
                Content::Element(child) => Some(*child),
                _ => None,
            })
            .collect()
    }

    /// Position of `id` among its parent's direct children.
    #[must_use]
    pub fn child_index(&self, id: ElementId) -> Option<usize> {
        let element = self.element(id);
        if element.embedded {
            return None;
        }
        let parent = element.parent?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Whether `ancestor` encloses `id` (or is `id`).
    #[must_use]
    pub fn contains(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = self.element(cur).parent;
        }
        false
    }

    /// Source text of a range (empty when out of bounds).
    #[must_use]
    pub fn slice(&self, range: ByteRange) -> &str {
        self.source.get(range.start..range.end).unwrap_or_default()
    }

    /// Full source text of an element.
    #[must_use]
    pub fn element_source(&self, id: ElementId) -> &str {
        self.slice(self.element(id).range)
    }

    /// Rendered text of an element and its descendants, whitespace collapsed.
    #[must_use]
    pub fn text_content(&self, id: ElementId) -> String {
        let mut raw = String::new();
        self.collect_text(id, &mut raw);
        normalize_text(&raw)
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        for content in &self.element(id).content {
            match content {
                Content::Text(range) => out.push_str(self.slice(*range)),
                Content::Expression(range) => {
                    if let Some(text) = string_expression(self.slice(*range)) {
                        out.push_str(&text);
                    }
                }
                Content::Element(child) => self.collect_text(*child, out),
            }
        }
    }

    /// Byte offset where the line containing `offset` starts.
    #[must_use]
    pub fn line_start_of(&self, offset: usize) -> usize {
        self.source
            .get(..offset)
            .and_then(|before| before.rfind('\n'))
            .map_or(0, |i| i + 1)
    }

    /// Leading whitespace of the line an element starts on.
    #[must_use]
    pub fn indent_of(&self, id: ElementId) -> &str {
        let line_start = self.line_start_of(self.element(id).range.start);
        let rest = self.source.get(line_start..).unwrap_or_default();
        let width = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        &rest[..width]
    }

    /// Whether the element's content spans several lines.
    #[must_use]
    pub fn is_multiline(&self, id: ElementId) -> bool {
        self.element(id)
            .inner_range()
            .is_some_and(|inner| self.slice(inner).contains('\n'))
    }

    /// Line/column of a byte offset.
    #[must_use]
    pub fn span_at(&self, offset: usize) -> SourceSpan {
        self.lines.span_at(&self.source, offset)
    }

    /// Byte offset of a line/column position.
    #[must_use]
    pub fn offset_of(&self, span: SourceSpan) -> Option<usize> {
        self.lines.offset_of(&self.source, span)
    }

    /// Location record describing an element.
    #[must_use]
    pub fn record(&self, id: ElementId) -> LocationRecord {
        let element = self.element(id);
        let tag = |range: ByteRange| TagRange::new(self.span_at(range.start), self.span_at(range.end));
        LocationRecord::new(
            self.file_path.clone(),
            element.parent.is_none(),
            tag(element.open_tag),
            element.close_tag.map(tag),
        )
    }

    /// Source locator (`@file:line:column`) of an element.
    #[must_use]
    pub fn locator(&self, id: ElementId) -> String {
        let start = self.span_at(self.element(id).open_tag.start);
        format!("@{}:{start}", self.file_path)
    }

    /// Element whose opening tag starts at `span`.
    #[must_use]
    pub fn find_at(&self, span: SourceSpan) -> Option<ElementId> {
        let offset = self.offset_of(span)?;
        self.elements
            .iter()
            .position(|e| e.open_tag.start == offset)
            .map(ElementId)
    }

    /// Every element matching `selector`, in document order.
    #[must_use]
    pub fn select(&self, selector: &Selector) -> Vec<ElementId> {
        match selector {
            Selector::Location { file_path, span } => {
                if file_path.as_deref().is_some_and(|f| f != self.file_path) {
                    return Vec::new();
                }
                self.find_at(*span).into_iter().collect()
            }
            Selector::Compound(simple) => self
                .ids()
                .filter(|id| {
                    let element = self.element(*id);
                    !element.is_fragment() && simple.matches(element)
                })
                .collect(),
        }
    }
}

/// Collapse whitespace runs and trim.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Value of a `{"..."}` / `{'...'}` expression container.
fn string_expression(container: &str) -> Option<String> {
    let inner = container.strip_prefix('{')?.strip_suffix('}')?.trim();
    if inner.len() >= 2 && inner.starts_with('"') && inner.ends_with('"') {
        return serde_json::from_str(inner).ok();
    }
    let quoted = inner
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| inner.strip_prefix('`').and_then(|s| s.strip_suffix('`')))?;
    (!quoted.contains("${")).then(|| quoted.to_string())
}

fn to_range(range: std::ops::Range<usize>) -> ByteRange {
    ByteRange::new(range.start, range.end)
}

struct Builder<'s> {
    source: &'s str,
    elements: Vec<Element>,
}

impl<'s> Builder<'s> {
    fn text(&self, range: ByteRange) -> &'s str {
        self.source.get(range.start..range.end).unwrap_or_default()
    }

    /// Walk arbitrary code, collecting elements under `parent`.
    fn visit(&mut self, node: &SyntaxNode<'_>, parent: Option<ElementId>) {
        match &*node.kind() {
            "jsx_element" | "jsx_self_closing_element" => {
                self.element(node, parent, true);
            }
            _ => {
                for child in node.children() {
                    self.visit(&child, parent);
                }
            }
        }
    }

    fn element(&mut self, node: &SyntaxNode<'_>, parent: Option<ElementId>, embedded: bool) -> ElementId {
        let id = ElementId(self.elements.len());
        let range = to_range(node.range());
        let depth = parent.map_or(0, |p| self.elements[p.0].depth + 1);
        self.elements.push(Element {
            tag: String::new(),
            name_end: range.start,
            range,
            open_tag: range,
            close_tag: None,
            attributes: Vec::new(),
            content: Vec::new(),
            parent,
            embedded: embedded && parent.is_some(),
            depth,
        });

        let mut open_tag = range;
        let mut close_tag = None;
        let mut attributes = Vec::new();
        let mut content = Vec::new();

        if node.kind() == "jsx_self_closing_element" {
            attributes = self.attributes(node, id);
        } else {
            for child in node.children() {
                let child_range = to_range(child.range());
                match &*child.kind() {
                    "jsx_opening_element" => {
                        open_tag = child_range;
                        attributes = self.attributes(&child, id);
                    }
                    "jsx_closing_element" => close_tag = Some(child_range),
                    "jsx_element" | "jsx_self_closing_element" => {
                        let nested = self.element(&child, Some(id), false);
                        content.push(Content::Element(nested));
                    }
                    "jsx_expression" => {
                        content.push(Content::Expression(child_range));
                        for inner in child.children() {
                            self.visit(&inner, Some(id));
                        }
                    }
                    _ => content.push(Content::Text(child_range)),
                }
            }
        }

        let (tag, name_end) = tag_name(self.text(open_tag), open_tag.start);
        let element = &mut self.elements[id.0];
        element.tag = tag;
        element.name_end = name_end;
        element.open_tag = open_tag;
        element.close_tag = close_tag;
        element.attributes = attributes;
        element.content = content;
        id
    }

    fn attributes(&mut self, tag: &SyntaxNode<'_>, owner: ElementId) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        for child in tag.children() {
            let range = to_range(child.range());
            match &*child.kind() {
                "jsx_attribute" => attributes.push(self.attribute(&child, owner)),
                "jsx_expression" => attributes.push(Attribute {
                    name: "...".to_string(),
                    range,
                    value: AttrValue::Spread,
                }),
                _ => {}
            }
        }
        attributes
    }

    fn attribute(&mut self, node: &SyntaxNode<'_>, owner: ElementId) -> Attribute {
        let range = to_range(node.range());
        let parts: Vec<_> = node.children().collect();
        let name = parts
            .first()
            .map(|n| self.text(to_range(n.range())).to_string())
            .unwrap_or_default();
        let value_node = parts.iter().skip_while(|n| n.kind() != "=").nth(1);

        let value = match value_node {
            None => AttrValue::Bare,
            Some(value) => {
                let value_range = to_range(value.range());
                match &*value.kind() {
                    "string" => {
                        let raw = self.text(value_range);
                        let unquoted = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
                        AttrValue::Literal {
                            range: value_range,
                            value: unquoted.to_string(),
                        }
                    }
                    "jsx_element" | "jsx_self_closing_element" => {
                        self.element(value, Some(owner), true);
                        AttrValue::Expression {
                            range: value_range,
                            object: None,
                        }
                    }
                    _ => {
                        let object = value
                            .children()
                            .find(|c| c.kind() == "object")
                            .map(|o| self.object(&o));
                        for inner in value.children() {
                            self.visit(&inner, Some(owner));
                        }
                        AttrValue::Expression {
                            range: value_range,
                            object,
                        }
                    }
                }
            }
        };

        Attribute { name, range, value }
    }

    fn object(&self, node: &SyntaxNode<'_>) -> ObjectLiteral {
        let mut entries = Vec::new();
        for child in node.children() {
            let range = to_range(child.range());
            match &*child.kind() {
                "pair" => {
                    let parts: Vec<_> = child.children().collect();
                    let key = parts.first().and_then(|k| self.property_key(k));
                    let value = parts
                        .iter()
                        .skip_while(|p| p.kind() != ":")
                        .nth(1)
                        .map(|v| to_range(v.range()));
                    entries.push(match (key, value) {
                        (Some(key), Some(value)) => ObjectEntry::Property { key, range, value },
                        _ => ObjectEntry::Other { range },
                    });
                }
                "spread_element" => entries.push(ObjectEntry::Spread { range }),
                "shorthand_property_identifier" | "method_definition" => {
                    entries.push(ObjectEntry::Other { range });
                }
                _ => {}
            }
        }
        ObjectLiteral {
            range: to_range(node.range()),
            entries,
        }
    }

    fn property_key(&self, node: &SyntaxNode<'_>) -> Option<String> {
        let raw = self.text(to_range(node.range()));
        match &*node.kind() {
            "property_identifier" | "number" => Some(raw.to_string()),
            "string" => raw.get(1..raw.len().saturating_sub(1)).map(str::to_string),
            _ => None,
        }
    }
}

/// Tag name at the start of an opening tag, and the offset just past it.
fn tag_name(open_tag: &str, tag_start: usize) -> (String, usize) {
    let after_lt = open_tag.strip_prefix('<').unwrap_or(open_tag);
    let leading = after_lt.len() - after_lt.trim_start().len();
    let name: String = after_lt[leading..]
        .chars()
        .take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '-' | ':'))
        .collect();
    let name_end = tag_start + (open_tag.len() - after_lt.len()) + leading + name.len();
    (name, name_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name() {
        assert_eq!(tag_name("<div className=\"a\">", 10), ("div".to_string(), 14));
        assert_eq!(tag_name("<Foo.Bar/>", 0), ("Foo.Bar".to_string(), 8));
        assert_eq!(tag_name("<>", 3), (String::new(), 4));
    }

    #[test]
    fn test_string_expression() {
        assert_eq!(string_expression("{\"a < b\"}"), Some("a < b".to_string()));
        assert_eq!(string_expression("{'x'}"), Some("x".to_string()));
        assert_eq!(string_expression("{`${a}`}"), None);
        assert_eq!(string_expression("{count}"), None);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello\n      world  "), "Hello world");
    }
}
