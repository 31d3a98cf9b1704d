//! Tree model: arena DOM, HTML parsing and selector matching.

mod arena;
mod element_ref;
mod tree_sink;

pub use arena::{
    ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, ChildrenIter, Descendants,
    ShadowRootMode,
};
pub use element_ref::{ArenaSelectors, ElementRef, SelectorMatcher, parse_selector_list};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::ArenaSink;

/// Parse an HTML document into an [`ArenaDom`].
///
/// `<template shadowrootmode>` elements are promoted to shadow roots of their
/// parent element.
///
/// # Example
///
/// ```
/// use shade::dom::parse_html;
///
/// let dom = parse_html(r#"<div id="host"><template shadowrootmode="open"><p>hi</p></template></div>"#);
/// let host = dom.get_element_by_id(dom.document(), "host").unwrap();
/// assert!(dom.shadow_root(host).is_some());
/// ```
pub fn parse_html(html: &str) -> ArenaDom {
    let sink = ArenaSink::new();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    let mut dom = result.into_dom();
    dom.promote_declarative_shadow_roots();
    dom
}
