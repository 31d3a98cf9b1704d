//! Computed style resolution across shadow boundaries.
//!
//! Resolution runs in two phases. The walk starts at the target element and
//! climbs towards the document. Every element passed is added to the current
//! scope. When the walk reaches a shadow root or the document, the `<style>`
//! sheets of that root are matched against the scope; each matching rule
//! appends its declarations to the element's accumulated text. Leaving a
//! shadow root empties the scope, so a tree's sheets never style elements of
//! an enclosing or enclosed tree.
//!
//! The merge then re-parses each accumulated text, keeps the inheritable
//! properties of the ancestors (nearest ancestor wins) and overlays the
//! target's own declarations.

use indexmap::IndexMap;

use super::inherited::is_inherited;
use super::property_manager::{PropertyManager, PropertyValue};
use crate::css::CssRule;
use crate::dom::{ArenaDom, ArenaNodeId, ElementRef, SelectorMatcher};
use crate::error::{Error, Result};

/// Declaration text matched for one element, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedStyle {
    pub element: ArenaNodeId,
    pub css_text: String,
}

impl MatchedStyle {
    pub fn new(element: ArenaNodeId) -> Self {
        Self {
            element,
            css_text: String::new(),
        }
    }

    /// Append a declaration body, keeping declarations `;`-separated.
    fn append(&mut self, body: &str) {
        if body.trim().is_empty() {
            return;
        }
        if !self.css_text.trim_end().is_empty() && !self.css_text.trim_end().ends_with(';') {
            self.css_text.push(';');
        }
        self.css_text.push_str(body);
    }

    /// Matched text followed by the element's inline `style` attribute.
    fn with_inline_style(&self, dom: &ArenaDom) -> String {
        let mut combined = self.clone();
        if let Some(inline) = dom.get_attr(self.element, "style") {
            combined.append(inline);
        }
        combined.css_text
    }
}

/// Everything matched for a target element and its ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeWalk {
    pub target: MatchedStyle,
    /// Ancestor elements, furthest first. Shadow hosts are included.
    pub ancestors: Vec<MatchedStyle>,
}

/// Resolve the style of `element`.
///
/// With `computed`, the cascade runs over every stylesheet in scope and
/// inheritable properties flow down from ancestors. Without it, only the
/// inline `style` attribute is parsed.
///
/// A computed request for an element that is not connected to the document
/// yields an empty result.
pub fn resolve_style(dom: &ArenaDom, element: ArenaNodeId, computed: bool) -> Result<PropertyManager> {
    if !dom.is_element(element) {
        return Err(Error::NotAnElement(element));
    }
    if !computed {
        return Ok(PropertyManager::from_css_text(
            dom.get_attr(element, "style").unwrap_or(""),
        ));
    }
    if !dom.is_connected(element) {
        log::debug!("{element:?} is not connected, computed style is empty");
        return Ok(PropertyManager::new());
    }

    let walk = walk_cascade(dom, element)?;
    Ok(merge_styles(dom, &walk))
}

/// Rule text matched for `element` and each of its ancestors.
///
/// For a disconnected element nothing matches and no ancestors are reported.
pub fn collect_matched_styles(dom: &ArenaDom, element: ArenaNodeId) -> Result<CascadeWalk> {
    if !dom.is_element(element) {
        return Err(Error::NotAnElement(element));
    }
    if !dom.is_connected(element) {
        return Ok(CascadeWalk {
            target: MatchedStyle::new(element),
            ancestors: Vec::new(),
        });
    }
    walk_cascade(dom, element)
}

/// Climb from `target` to the document, matching each root's sheets against
/// the elements of its scope.
///
/// Does not check connectivity: the walk ends wherever the parent chain does.
fn walk_cascade(dom: &ArenaDom, target: ArenaNodeId) -> Result<CascadeWalk> {
    let mut matcher = SelectorMatcher::new();
    let mut records = vec![MatchedStyle::new(target)];
    let mut scope = vec![0];
    let mut node = dom.parent_node(target);

    while let Some(id) = node {
        if id == dom.document() {
            apply_style_elements(dom, id, &mut records, &scope, &mut matcher)?;
            break;
        }
        if let Some(host) = dom.shadow_host(id) {
            apply_style_elements(dom, id, &mut records, &scope, &mut matcher)?;
            log::trace!("leaving shadow root {id:?} for host {host:?}");
            scope.clear();
            node = Some(host);
            continue;
        }
        if dom.is_element(id) {
            scope.push(records.len());
            records.push(MatchedStyle::new(id));
        }
        node = dom.parent_node(id);
    }

    let mut ancestors = records.split_off(1);
    ancestors.reverse();
    let target = records.swap_remove(0);
    Ok(CascadeWalk { target, ancestors })
}

/// Match the sheets of every `<style>` element under `root`.
fn apply_style_elements(
    dom: &ArenaDom,
    root: ArenaNodeId,
    records: &mut [MatchedStyle],
    scope: &[usize],
    matcher: &mut SelectorMatcher,
) -> Result<()> {
    if scope.is_empty() {
        return Ok(());
    }
    for style in dom.style_elements(root) {
        if let Some(media) = dom.get_attr(style, "media")
            && !dom.viewport().match_media(media).unwrap_or(false)
        {
            log::trace!("skipping <style media=\"{media}\">");
            continue;
        }
        if let Some(sheet) = dom.style_sheet(style) {
            apply_rules(dom, &sheet.rules, records, scope, matcher)?;
        }
    }
    Ok(())
}

/// Append the declarations of every rule in `rules` to the scoped records
/// it matches. `@media` rules recurse when their condition holds.
fn apply_rules(
    dom: &ArenaDom,
    rules: &[CssRule],
    records: &mut [MatchedStyle],
    scope: &[usize],
    matcher: &mut SelectorMatcher,
) -> Result<()> {
    if scope.is_empty() {
        return Ok(());
    }
    for rule in rules {
        match rule {
            CssRule::Style(style) => {
                if style.selector_text.is_empty() {
                    continue;
                }
                for &index in scope {
                    let record = &mut records[index];
                    if matcher.matches(ElementRef::new(dom, record.element), &style.selector_text)? {
                        record.append(style.declaration_body());
                    }
                }
            }
            CssRule::Media(media) => {
                if dom.viewport().match_media(&media.condition_text)? {
                    apply_rules(dom, &media.rules, records, scope, matcher)?;
                }
            }
        }
    }
    Ok(())
}

/// Build the computed declarations from a finished walk.
fn merge_styles(dom: &ArenaDom, walk: &CascadeWalk) -> PropertyManager {
    let mut inherited: IndexMap<String, PropertyValue> = IndexMap::new();
    for ancestor in &walk.ancestors {
        let declared = PropertyManager::from_css_text(&ancestor.with_inline_style(dom));
        for (name, value) in declared.iter() {
            if is_inherited(name) {
                inherited.insert(name.to_string(), value.clone());
            }
        }
    }

    let mut own = PropertyManager::from_css_text(&walk.target.with_inline_style(dom));
    inherited.extend(own.properties().clone());
    own.set_properties(inherited);
    own
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::Stylesheet;
    use crate::dom::ShadowRootMode;

    fn add_style(dom: &mut ArenaDom, parent: ArenaNodeId, css: &str) -> ArenaNodeId {
        let style = dom.create_html_element("style", &[]);
        dom.append(parent, style);
        dom.append_text(style, css);
        style
    }

    #[test]
    fn test_document_child_receives_document_rules() {
        let mut dom = ArenaDom::new();
        let html = dom.create_html_element("html", &[]);
        dom.append(dom.document(), html);
        add_style(&mut dom, html, "html { color: red }");

        let style = resolve_style(&dom, html, true).unwrap();
        assert_eq!(style.get_property_value("color"), "red");
    }

    #[test]
    fn test_shadow_root_child_receives_shadow_rules() {
        let mut dom = ArenaDom::new();
        let host = dom.create_html_element("div", &[]);
        dom.append(dom.document(), host);
        let root = dom.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let span = dom.create_html_element("span", &[]);
        dom.append(root, span);
        add_style(&mut dom, root, "span { color: blue }");

        let walk = collect_matched_styles(&dom, span).unwrap();
        assert_eq!(walk.target.css_text, " color: blue; ");
        assert_eq!(walk.ancestors.len(), 1);
        assert_eq!(walk.ancestors[0].element, host);
    }

    #[test]
    fn test_ancestors_furthest_first() {
        let mut dom = ArenaDom::new();
        let a = dom.create_html_element("section", &[]);
        let b = dom.create_html_element("div", &[]);
        let c = dom.create_html_element("p", &[]);
        dom.append(dom.document(), a);
        dom.append(a, b);
        dom.append(b, c);

        let walk = collect_matched_styles(&dom, c).unwrap();
        let order: Vec<_> = walk.ancestors.iter().map(|r| r.element).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn test_detached_subtree_walk_is_partial() {
        let mut dom = ArenaDom::new();
        let host = dom.create_html_element("div", &[]);
        let root = dom.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let span = dom.create_html_element("span", &[]);
        dom.append(root, span);
        add_style(&mut dom, root, "span { color: blue }");

        // Shadow-local rules still apply when nothing checks connectivity.
        let walk = walk_cascade(&dom, span).unwrap();
        assert_eq!(walk.target.css_text, " color: blue; ");

        assert!(resolve_style(&dom, span, true).unwrap().is_empty());
        let public = collect_matched_styles(&dom, span).unwrap();
        assert!(public.target.css_text.is_empty());
        assert!(public.ancestors.is_empty());
    }

    #[test]
    fn test_declarations_are_separated() {
        let mut record = MatchedStyle::new(ArenaNodeId::NONE);
        record.append("color: red");
        record.append("margin: 0");
        record.append("   ");
        assert_eq!(record.css_text, "color: red;margin: 0");

        let pm = PropertyManager::from_css_text(&record.css_text);
        assert_eq!(pm.get_property_value("color"), "red");
        assert_eq!(pm.get_property_value("margin"), "0");
    }

    #[test]
    fn test_empty_scope_is_noop() {
        let mut dom = ArenaDom::new();
        let p = dom.create_html_element("p", &[]);
        dom.append(dom.document(), p);
        let mut records = vec![MatchedStyle::new(p)];
        let rules = vec![CssRule::style("p", "p { color: red; }")];

        apply_rules(&dom, &rules, &mut records, &[], &mut SelectorMatcher::new()).unwrap();
        assert!(records[0].css_text.is_empty());
    }

    #[test]
    fn test_programmatic_rules() {
        let mut dom = ArenaDom::new();
        let p = dom.create_html_element("p", &[]);
        dom.append(dom.document(), p);
        let doc = dom.document();
        let style = add_style(&mut dom, doc, "");

        dom.set_style_sheet(
            style,
            Stylesheet {
                rules: vec![
                    CssRule::style("", "{ color: green; }"),
                    CssRule::style("p", "p { color: red; }"),
                    CssRule::media("(min-width: 2000px)", vec![CssRule::style("p", "p { color: blue; }")]),
                    CssRule::media("all", vec![CssRule::style("p", "p { margin: 0; }")]),
                ],
            },
        );
        let computed = resolve_style(&dom, p, true).unwrap();
        assert_eq!(computed.get_property_value("color"), "red");
        assert_eq!(computed.get_property_value("margin"), "0");

        dom.set_style_sheet(
            style,
            Stylesheet {
                rules: vec![CssRule::style("p:::", "p { color: red; }")],
            },
        );
        assert!(matches!(
            resolve_style(&dom, p, true),
            Err(Error::InvalidSelector { .. })
        ));

        dom.set_style_sheet(
            style,
            Stylesheet {
                rules: vec![CssRule::media("(min-width:", vec![])],
            },
        );
        assert!(matches!(
            resolve_style(&dom, p, true),
            Err(Error::InvalidMediaQuery { .. })
        ));
    }

    #[test]
    fn test_non_element_rejected() {
        let mut dom = ArenaDom::new();
        let text = dom.create_text("x".to_string());
        dom.append(dom.document(), text);
        assert!(matches!(
            resolve_style(&dom, text, true),
            Err(Error::NotAnElement(id)) if id == text
        ));
        assert!(matches!(
            resolve_style(&dom, dom.document(), false),
            Err(Error::NotAnElement(_))
        ));
    }

    #[test]
    fn test_inline_outranks_matched_rules() {
        let mut dom = ArenaDom::new();
        let p = dom.create_html_element("p", &[("style", "color: green")]);
        dom.append(dom.document(), p);
        let doc = dom.document();
        add_style(&mut dom, doc, "p { color: red; margin: 0 }");

        let computed = resolve_style(&dom, p, true).unwrap();
        assert_eq!(computed.get_property_value("color"), "green");
        assert_eq!(computed.get_property_value("margin"), "0");

        let specified = resolve_style(&dom, p, false).unwrap();
        assert_eq!(specified.css_text(), "color: green;");
    }
}
