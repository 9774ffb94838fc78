//! Inline style and class edits on one element.
//!
//! Only the attribute text that changes is rewritten; untouched entries of a
//! style object keep their exact source.

use omni_ast::{
    AttrValue, Attribute, Element, ElementId, MarkupTree, ObjectEntry, ObjectLiteral, QuoteStyle, RenderOptions,
    attribute_value, camel_case, style_key, style_value,
};
use omni_types::{AttributeSnapshot, ByteRange, FilePatch, StyleDelta, StyleProperty};

use crate::classes::merge_classes;
use crate::error::EditError;

const STYLE: &str = "style";
const CLASS_NAME: &str = "className";

/// Edits for one element, plus the attribute sources they overwrite.
#[derive(Debug, Default)]
pub(crate) struct StylePlan {
    pub patches: Vec<FilePatch>,
    pub prior: Vec<AttributeSnapshot>,
}

pub(crate) fn plan(
    tree: &MarkupTree,
    id: ElementId,
    delta: &StyleDelta,
    options: &RenderOptions,
) -> Result<StylePlan, EditError> {
    let element = tree.element(id);
    let mut planner = Planner {
        tree,
        element,
        options,
        plan: StylePlan::default(),
        appended: Vec::new(),
    };
    match delta {
        StyleDelta::Merge {
            properties,
            class_names,
        } => {
            if !properties.is_empty() {
                planner.snapshot(STYLE);
                planner.merge_style(properties)?;
            }
            if !class_names.is_empty() {
                planner.snapshot(CLASS_NAME);
                planner.merge_class_names(class_names)?;
            }
        }
        StyleDelta::Restore { attributes } => {
            for snapshot in attributes {
                planner.snapshot(&snapshot.name);
                planner.restore(snapshot);
            }
        }
    }
    Ok(planner.finish())
}

struct Planner<'a> {
    tree: &'a MarkupTree,
    element: &'a Element,
    options: &'a RenderOptions,
    plan: StylePlan,
    /// Attribute sources appended after the last attribute.
    appended: Vec<String>,
}

impl Planner<'_> {
    fn snapshot(&mut self, name: &str) {
        let source = self
            .element
            .attribute(name)
            .map(|a| self.tree.slice(a.range).to_string());
        self.plan.prior.push(AttributeSnapshot {
            target_index: 0,
            name: name.to_string(),
            source,
        });
    }

    fn replace(&mut self, range: ByteRange, text: impl Into<String>) {
        self.plan
            .patches
            .push(FilePatch::new(self.tree.file_path(), range, text));
    }

    /// Drop an attribute together with the whitespace before it.
    fn remove(&mut self, attribute: &Attribute) {
        let before = self.tree.slice(ByteRange::new(0, attribute.range.start));
        let start = before.trim_end().len();
        self.replace(ByteRange::new(start, attribute.range.end), "");
    }

    fn finish(mut self) -> StylePlan {
        if !self.appended.is_empty() {
            let at = self
                .element
                .attributes
                .last()
                .map_or(self.element.name_end, |a| a.range.end);
            let text: String = self.appended.iter().map(|a| format!(" {a}")).collect();
            self.replace(ByteRange::new(at, at), text);
        }
        self.plan
    }

    fn merge_style(&mut self, properties: &[StyleProperty]) -> Result<(), EditError> {
        let element = self.element;
        let Some(attribute) = element.attribute(STYLE) else {
            let entries = object_entries(&[], properties, self.options.quote, |_| String::new());
            if !entries.is_empty() {
                self.appended.push(format!("style={{{{ {} }}}}", entries.join(", ")));
            }
            return Ok(());
        };

        match &attribute.value {
            AttrValue::Expression {
                object: Some(object),
                ..
            } => match self.rebuild_object(object, properties) {
                Some(text) => self.replace(object.range, text),
                None => self.remove(attribute),
            },
            AttrValue::Expression { range, object: None } => {
                let raw = self.tree.slice(*range);
                let inner = raw
                    .get(1..raw.len().saturating_sub(1))
                    .unwrap_or_default()
                    .trim();
                let mut entries = vec![format!("...{inner}")];
                for property in last_wins(properties) {
                    let value = property
                        .value
                        .as_deref()
                        .map_or_else(|| "undefined".to_string(), |v| style_value(v, self.options.quote));
                    entries.push(format!("{}: {value}", style_key(&property.name)));
                }
                self.replace(*range, format!("{{{{ {} }}}}", entries.join(", ")));
            }
            AttrValue::Literal { range, value } => {
                let raw = self.tree.slice(*range);
                let quote = if raw.starts_with('\'') {
                    QuoteStyle::Single
                } else {
                    QuoteStyle::Double
                };
                self.replace(*range, quote.quote(&merge_css(value, properties)));
            }
            AttrValue::Bare | AttrValue::Spread => {
                return Err(EditError::Unsupported(format!(
                    "style attribute of <{}> is not an object or string",
                    self.element.tag
                )));
            }
        }
        Ok(())
    }

    /// New object source, `None` when no entry survives.
    fn rebuild_object(&self, object: &ObjectLiteral, properties: &[StyleProperty]) -> Option<String> {
        let tree = self.tree;
        let entries = object_entries(&object.entries, properties, self.options.quote, |range| {
            tree.slice(range).to_string()
        });
        if entries.is_empty() {
            return None;
        }

        let raw = tree.slice(object.range);
        let multiline = raw.contains('\n') && !object.entries.is_empty();
        if !multiline {
            return Some(format!("{{ {} }}", entries.join(", ")));
        }

        let first = object.entries[0].range().start;
        let close = object.range.end.saturating_sub(1);
        let close_line = tree.slice(ByteRange::new(tree.line_start_of(close), close));
        let close_indent = &close_line[..close_line.len() - close_line.trim_start().len()];
        // Indent of the first entry that opens its own line.
        let entry_indent = object
            .entries
            .iter()
            .find_map(|entry| {
                let start = entry.range().start;
                let before = tree.slice(ByteRange::new(tree.line_start_of(start), start));
                before.trim().is_empty().then(|| before.to_string())
            })
            .unwrap_or_else(|| format!("{close_indent}{}", self.options.indent_unit));
        let last_end = object.entries.last().map_or(first, |e| e.range().end);
        let trailing = tree.slice(ByteRange::new(last_end, close)).contains(',');

        let mut out = String::from("{\n");
        out.push_str(
            &entries
                .iter()
                .map(|e| format!("{entry_indent}{e}"))
                .collect::<Vec<_>>()
                .join(",\n"),
        );
        if trailing {
            out.push(',');
        }
        out.push('\n');
        out.push_str(close_indent);
        out.push('}');
        Some(out)
    }

    fn merge_class_names(&mut self, class_names: &[String]) -> Result<(), EditError> {
        let element = self.element;
        let Some(attribute) = element.attribute(CLASS_NAME) else {
            let merged = merge_classes("", class_names);
            if !merged.is_empty() {
                self.appended
                    .push(format!("className={}", attribute_value(&merged, self.options.quote)));
            }
            return Ok(());
        };
        match &attribute.value {
            AttrValue::Literal { range, value } => {
                let merged = merge_classes(value, class_names);
                self.replace(ByteRange::new(range.start + 1, range.end - 1), merged);
            }
            AttrValue::Bare => {
                let merged = merge_classes("", class_names);
                let text = format!("className={}", attribute_value(&merged, self.options.quote));
                self.replace(attribute.range, text);
            }
            AttrValue::Expression { .. } | AttrValue::Spread => {
                return Err(EditError::Unsupported(format!(
                    "className of <{}> is computed",
                    self.element.tag
                )));
            }
        }
        Ok(())
    }

    fn restore(&mut self, snapshot: &AttributeSnapshot) {
        let element = self.element;
        match (element.attribute(&snapshot.name), &snapshot.source) {
            (Some(current), Some(source)) => self.replace(current.range, source.clone()),
            (Some(current), None) => self.remove(current),
            (None, Some(source)) => self.appended.push(source.clone()),
            (None, None) => {}
        }
    }
}

/// Properties with duplicate keys collapsed; the last value wins, the first
/// position is kept.
fn last_wins(properties: &[StyleProperty]) -> Vec<StyleProperty> {
    let mut out: Vec<StyleProperty> = Vec::new();
    for property in properties {
        let key = camel_case(&property.name);
        match out.iter_mut().find(|p| camel_case(&p.name) == key) {
            Some(existing) => existing.value.clone_from(&property.value),
            None => out.push(property.clone()),
        }
    }
    out
}

/// Entry sources after merging `properties` into `existing`.
fn object_entries(
    existing: &[ObjectEntry],
    properties: &[StyleProperty],
    quote: QuoteStyle,
    source_of: impl Fn(ByteRange) -> String,
) -> Vec<String> {
    let mut pending = last_wins(properties);
    let mut out = Vec::new();
    for entry in existing {
        let ObjectEntry::Property { key, range, value } = entry else {
            out.push(source_of(entry.range()));
            continue;
        };
        let camel = camel_case(key);
        let Some(pos) = pending.iter().position(|p| camel_case(&p.name) == camel) else {
            out.push(source_of(*range));
            continue;
        };
        let property = pending.remove(pos);
        if let Some(new_value) = property.value {
            let head = source_of(ByteRange::new(range.start, value.start));
            let tail = source_of(ByteRange::new(value.end, range.end));
            out.push(format!("{head}{}{tail}", style_value(&new_value, quote)));
        }
    }
    for property in pending {
        if let Some(value) = property.value {
            out.push(format!("{}: {}", style_key(&property.name), style_value(&value, quote)));
        }
    }
    out
}

/// Merge properties into a CSS declaration string.
fn merge_css(css: &str, properties: &[StyleProperty]) -> String {
    let mut declarations: Vec<(String, String)> = css
        .split(';')
        .filter_map(|d| d.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .filter(|(n, _)| !n.is_empty())
        .collect();
    for property in properties {
        let key = camel_case(&property.name);
        let pos = declarations.iter().position(|(n, _)| camel_case(n) == key);
        match (pos, &property.value) {
            (Some(i), Some(value)) => declarations[i].1.clone_from(value),
            (Some(i), None) => {
                declarations.remove(i);
            }
            (None, Some(value)) => declarations.push((property.name.clone(), value.clone())),
            (None, None) => {}
        }
    }
    declarations
        .iter()
        .map(|(n, v)| format!("{n}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}
