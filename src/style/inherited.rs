//! The set of properties that inherit from ancestors.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Properties whose values propagate from an element to its descendants.
pub const INHERITED_PROPERTIES: &[&str] = &[
    "border-collapse",
    "border-spacing",
    "caption-side",
    "color",
    "cursor",
    "direction",
    "empty-cells",
    "font-family",
    "font-size",
    "font-style",
    "font-variant",
    "font-weight",
    "font-size-adjust",
    "font-stretch",
    "font",
    "letter-spacing",
    "line-height",
    "list-style-image",
    "list-style-position",
    "list-style-type",
    "list-style",
    "orphans",
    "quotes",
    "tab-size",
    "text-align",
    "text-align-last",
    "text-decoration-color",
    "text-indent",
    "text-justify",
    "text-shadow",
    "text-transform",
    "visibility",
    "white-space",
    "widows",
    "word-break",
    "word-spacing",
    "word-wrap",
];

static INHERITED: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| INHERITED_PROPERTIES.iter().copied().collect());

/// Whether `name` (a lowercase property name) inherits.
pub fn is_inherited(name: &str) -> bool {
    INHERITED.contains(name)
}
