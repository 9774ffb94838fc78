//! Utility-class merging.
//!
//! Incoming classes replace existing ones of the same conflict group under
//! the same variant (`hover:bg-red-500` replaces `hover:bg-blue-200` but not
//! `bg-blue-200`). Unknown classes only conflict with exact duplicates.

use once_cell::sync::Lazy;
use regex::Regex;

/// Conflict groups: pattern plus an optional fixed group name. Patterns with
/// a capture use the capture as part of the group (`px` vs `py`).
static GROUPS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    let table: &[(&str, &str)] = &[
        (r"^(block|inline-block|inline|flex|inline-flex|grid|inline-grid|table|contents|hidden)$", "display"),
        (r"^(static|fixed|absolute|relative|sticky)$", "position"),
        (r"^(p|px|py|pt|pr|pb|pl|ps|pe)-.+$", "$1"),
        (r"^(m|mx|my|mt|mr|mb|ml|ms|me)-.+$", "$1"),
        (r"^(space-x|space-y|gap|gap-x|gap-y)-.+$", "$1"),
        (r"^(w|min-w|max-w|h|min-h|max-h|size)-.+$", "$1"),
        (r"^text-(xs|sm|base|lg|[2-9]?xl|\[\d.*\])$", "font-size"),
        (r"^text-(left|center|right|justify|start|end)$", "text-align"),
        (r"^text-.+$", "text-color"),
        (r"^bg-(auto|cover|contain)$", "bg-size"),
        (r"^bg-(fixed|local|scroll)$", "bg-attachment"),
        (r"^bg-(bottom|center|left|left-bottom|left-top|right|right-bottom|right-top|top)$", "bg-position"),
        (r"^bg-(repeat|no-repeat|repeat-x|repeat-y|repeat-round|repeat-space)$", "bg-repeat"),
        (r"^bg-(none|gradient-.+)$", "bg-image"),
        (r"^bg-.+$", "bg-color"),
        (r"^font-(thin|extralight|light|normal|medium|semibold|bold|extrabold|black|\[\d+\])$", "font-weight"),
        (r"^font-.+$", "font-family"),
        (r"^rounded(-.+)?$", "rounded"),
        (r"^border(-[0-9]+|-\[.+\])?$", "border-width"),
        (r"^border-(solid|dashed|dotted|double|none)$", "border-style"),
        (r"^border-.+$", "border-color"),
        (r"^shadow(-.+)?$", "shadow"),
        (r"^opacity-.+$", "opacity"),
        (r"^z-.+$", "z-index"),
        (r"^flex-(row|row-reverse|col|col-reverse)$", "flex-direction"),
        (r"^flex-(wrap|wrap-reverse|nowrap)$", "flex-wrap"),
        (r"^flex-(1|auto|initial|none)$", "flex"),
        (r"^justify-.+$", "justify-content"),
        (r"^items-.+$", "align-items"),
        (r"^leading-.+$", "line-height"),
        (r"^tracking-.+$", "letter-spacing"),
        (r"^overflow-(auto|hidden|clip|visible|scroll)$", "overflow"),
        (r"^(inset|inset-x|inset-y|top|right|bottom|left)-.+$", "$1"),
        (r"^cursor-.+$", "cursor"),
        (r"^grid-cols-.+$", "grid-cols"),
        (r"^col-span-.+$", "col-span"),
    ];
    table
        .iter()
        .filter_map(|(pattern, group)| Regex::new(pattern).ok().map(|re| (re, *group)))
        .collect()
});

/// Split `hover:md:bg-red-500` into (`hover:md:`, `bg-red-500`), ignoring
/// colons inside arbitrary values.
fn split_variant(class: &str) -> (&str, &str) {
    let mut depth = 0i32;
    let mut split = 0;
    for (i, c) in class.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth -= 1,
            ':' if depth == 0 => split = i + 1,
            _ => {}
        }
    }
    class.split_at(split)
}

/// Conflict key of a class: variant plus group, `None` for unknown classes.
fn conflict_key(class: &str) -> Option<String> {
    let (variant, base) = split_variant(class);
    let base = base.trim_start_matches('!').trim_start_matches('-');
    GROUPS.iter().find_map(|(re, group)| {
        let caps = re.captures(base)?;
        let mut name = String::new();
        caps.expand(group, &mut name);
        Some(format!("{variant}{name}"))
    })
}

/// Merge `incoming` into the whitespace-separated `existing` class list.
///
/// Existing order is kept for survivors; incoming classes are appended in
/// order, later ones winning over earlier ones of the same group.
#[must_use]
pub fn merge_classes(existing: &str, incoming: &[String]) -> String {
    let mut classes: Vec<String> = existing.split_whitespace().map(str::to_string).collect();
    for class in incoming.iter().flat_map(|c| c.split_whitespace()) {
        let key = conflict_key(class);
        classes.retain(|current| {
            current != class && (key.is_none() || conflict_key(current) != key)
        });
        classes.push(class.to_string());
    }
    classes.join(" ")
}
