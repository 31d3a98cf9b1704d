//! Arena-based DOM with shadow roots.
//!
//! All nodes live in one vector and link to each other by index. A shadow
//! root is an ordinary arena node whose parent link is empty; it points at its
//! host, and the host points back at it. This keeps upward traversal linear:
//! from inside a shadow tree the walk reaches the shadow root, then continues
//! at the host.

use std::collections::HashMap;

use html5ever::{LocalName, Namespace, QualName, ns};

use crate::css::{Stylesheet, Viewport};
use crate::error::{Error, Result};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaNodeId(pub u32);

impl ArenaNodeId {
    /// Sentinel value for no node.
    pub const NONE: ArenaNodeId = ArenaNodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    fn to_option(self) -> Option<ArenaNodeId> {
        self.is_some().then_some(self)
    }
}

/// Encapsulation mode of a shadow root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowRootMode {
    Open,
    Closed,
}

impl ShadowRootMode {
    /// Parse a `shadowrootmode` attribute value.
    pub fn from_attr(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("open") {
            Some(Self::Open)
        } else if value.eq_ignore_ascii_case("closed") {
            Some(Self::Closed)
        } else {
            None
        }
    }
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted id for fast matching.
        id: Option<String>,
        /// Pre-extracted classes for fast matching.
        classes: Vec<String>,
        /// Attached shadow root, if any.
        shadow_root: ArenaNodeId,
    },
    /// Root of a shadow tree attached to `host`.
    ShadowRoot {
        host: ArenaNodeId,
        mode: ShadowRootMode,
    },
    /// Text content.
    Text(String),
    /// Comment (ignored but needed for TreeSink).
    Comment(String),
    /// Document type declaration.
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Attribute without namespace.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.into(),
        }
    }
}

/// A node in the arena DOM.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: ArenaNodeId,
    pub first_child: ArenaNodeId,
    pub last_child: ArenaNodeId,
    pub prev_sibling: ArenaNodeId,
    pub next_sibling: ArenaNodeId,
}

impl ArenaNode {
    fn new(data: ArenaNodeData) -> Self {
        Self {
            data,
            parent: ArenaNodeId::NONE,
            first_child: ArenaNodeId::NONE,
            last_child: ArenaNodeId::NONE,
            prev_sibling: ArenaNodeId::NONE,
            next_sibling: ArenaNodeId::NONE,
        }
    }
}

/// Arena-based DOM tree.
///
/// Besides the nodes, the arena owns the parsed stylesheet of every `<style>`
/// element and the viewport that media queries are evaluated against.
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
    document: ArenaNodeId,
    /// Parsed sheets keyed by their `<style>` element.
    style_sheets: HashMap<ArenaNodeId, Stylesheet>,
    viewport: Viewport,
}

impl ArenaDom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        Self::with_viewport(Viewport::default())
    }

    /// Create a new empty DOM whose default view is `viewport`.
    pub fn with_viewport(viewport: Viewport) -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: ArenaNodeId::NONE,
            style_sheets: HashMap::new(),
            viewport,
        };
        dom.document = dom.alloc(ArenaNode::new(ArenaNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: ArenaNode) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> ArenaNodeId {
        self.document
    }

    /// The document's default view.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Get a node by ID.
    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        let mut id = None;
        let mut classes = Vec::new();

        for attr in &attrs {
            if attr.name.local.as_ref() == "id" {
                id = Some(attr.value.clone());
            } else if attr.name.local.as_ref() == "class" {
                classes = split_classes(&attr.value);
            }
        }

        self.alloc(ArenaNode::new(ArenaNodeData::Element {
            name,
            attrs,
            id,
            classes,
            shadow_root: ArenaNodeId::NONE,
        }))
    }

    /// Create an HTML element from a tag name and `(name, value)` attribute pairs.
    pub fn create_html_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> ArenaNodeId {
        let name = QualName::new(None, ns!(html), LocalName::from(tag));
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute::new(name, *value))
            .collect();
        self.create_element(name, attrs)
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Text(text)))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(
        &mut self,
        name: String,
        public_id: String,
        system_id: String,
    ) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append a child to a parent node, moving it out of any old parent.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        self.detach(child);
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
        }

        if last_child.is_some()
            && let Some(last_node) = self.get_mut(last_child)
        {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }

        self.refresh_style_sheet(parent);
    }

    /// Insert a node before a sibling, moving it out of any old parent.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, new_node: ArenaNodeId) {
        if sibling == new_node {
            return;
        }
        self.detach(new_node);
        let parent = self
            .get(sibling)
            .map(|n| n.parent)
            .unwrap_or(ArenaNodeId::NONE);
        let prev = self
            .get(sibling)
            .map(|n| n.prev_sibling)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }

        self.refresh_style_sheet(parent);
    }

    /// Append text to an existing text node, or create new if last child isn't text.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        let merged = match self.get_mut(last_child).map(|n| &mut n.data) {
            Some(ArenaNodeData::Text(existing)) => {
                existing.push_str(text);
                true
            }
            _ => false,
        };
        if merged {
            self.refresh_style_sheet(parent);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Unlink a node from its parent. The node keeps its own subtree.
    pub fn detach(&mut self, target: ArenaNodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) if n.parent.is_some() => (n.parent, n.prev_sibling, n.next_sibling),
            _ => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = ArenaNodeId::NONE;
            node.prev_sibling = ArenaNodeId::NONE;
            node.next_sibling = ArenaNodeId::NONE;
        }

        self.refresh_style_sheet(parent);
    }

    /// Replace all children of `id` with a single text node.
    pub fn set_text_content(&mut self, id: ArenaNodeId, text: &str) {
        let children: Vec<_> = self.children(id).collect();
        for child in children {
            self.detach(child);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text.to_string());
            self.append(id, text_node);
        }
        self.refresh_style_sheet(id);
    }

    /// Attach a new, empty shadow root to `host`.
    pub fn attach_shadow(&mut self, host: ArenaNodeId, mode: ShadowRootMode) -> Result<ArenaNodeId> {
        match self.get(host).map(|n| &n.data) {
            Some(ArenaNodeData::Element { shadow_root, .. }) if shadow_root.is_some() => {
                return Err(Error::ShadowRootAlreadyAttached(host));
            }
            Some(ArenaNodeData::Element { .. }) => {}
            _ => return Err(Error::NotAnElement(host)),
        }

        let root = self.alloc(ArenaNode::new(ArenaNodeData::ShadowRoot { host, mode }));
        if let Some(ArenaNodeData::Element { shadow_root, .. }) =
            self.get_mut(host).map(|n| &mut n.data)
        {
            *shadow_root = root;
        }
        Ok(root)
    }

    /// Shadow root attached to `host`.
    pub fn shadow_root(&self, host: ArenaNodeId) -> Option<ArenaNodeId> {
        self.get(host).and_then(|n| match &n.data {
            ArenaNodeData::Element { shadow_root, .. } => shadow_root.to_option(),
            _ => None,
        })
    }

    /// Host of a shadow root. `None` for every other kind of node.
    pub fn shadow_host(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::ShadowRoot { host, .. } => host.to_option(),
            _ => None,
        })
    }

    /// Check if node is a shadow root.
    pub fn is_shadow_root(&self, id: ArenaNodeId) -> bool {
        self.shadow_host(id).is_some()
    }

    /// Parent node. Shadow roots have none.
    pub fn parent_node(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        self.get(id).and_then(|n| n.parent.to_option())
    }

    /// Whether `id` is reachable from the document, crossing shadow roots to
    /// their hosts.
    ///
    /// Template contents are inert and never connected.
    pub fn is_connected(&self, id: ArenaNodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.document {
                return true;
            }
            let next = match self.shadow_host(current) {
                Some(host) => Some(host),
                None => self.parent_node(current),
            };
            match next {
                Some(next) if self.is_html_element_named(next, "template") => return false,
                Some(next) => current = next,
                None => return false,
            }
        }
    }

    /// Root of the tree containing `id`: the document, a shadow root, or the
    /// top of a detached subtree.
    pub fn root_node(&self, id: ArenaNodeId) -> ArenaNodeId {
        let mut current = id;
        while let Some(parent) = self.parent_node(current) {
            current = parent;
        }
        current
    }

    /// Promote `<template shadowrootmode>` children into shadow roots.
    ///
    /// Only the first declarative template of a host is promoted; later ones
    /// stay in the light tree as inert templates.
    pub fn promote_declarative_shadow_roots(&mut self) {
        let templates: Vec<ArenaNodeId> = (0..self.nodes.len() as u32)
            .map(ArenaNodeId)
            .filter(|&id| self.declarative_shadow_mode(id).is_some())
            .collect();

        for template in templates {
            let Some(mode) = self.declarative_shadow_mode(template) else {
                continue;
            };
            let Some(host) = self.parent_node(template) else {
                continue;
            };
            if !self.is_element(host) || self.shadow_root(host).is_some() {
                continue;
            }

            self.detach(template);
            let Ok(root) = self.attach_shadow(host, mode) else {
                continue;
            };
            let children: Vec<_> = self.children(template).collect();
            for child in children {
                self.append(root, child);
            }
        }
    }

    fn declarative_shadow_mode(&self, id: ArenaNodeId) -> Option<ShadowRootMode> {
        if !self.is_html_element_named(id, "template") {
            return None;
        }
        self.get_attr(id, "shadowrootmode")
            .or_else(|| self.get_attr(id, "shadowroot"))
            .and_then(ShadowRootMode::from_attr)
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: ArenaNodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(ArenaNodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Descendants of `root` in tree order, excluding `root` itself.
    ///
    /// Shadow trees are not entered: a shadow root is not a child of its host.
    pub fn descendants(&self, root: ArenaNodeId) -> Descendants<'_> {
        Descendants::new(self, root, true)
    }

    /// Nodes under `root` in shadow-including tree order: a host's shadow
    /// root and its tree come right after the host, before its light
    /// children. Template contents are skipped.
    pub fn shadow_including_descendants(&self, root: ArenaNodeId) -> Vec<ArenaNodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id != root {
                order.push(id);
                if self.is_html_element_named(id, "template") {
                    continue;
                }
            }
            let mut children: Vec<_> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
            stack.extend(self.shadow_root(id));
        }
        order
    }

    /// `<style>` elements under `root` in tree order.
    ///
    /// Like `querySelectorAll("style")`: neither shadow trees nor template
    /// contents are searched.
    pub fn style_elements(&self, root: ArenaNodeId) -> Vec<ArenaNodeId> {
        Descendants::new(self, root, false)
            .filter(|&id| self.is_html_element_named(id, "style"))
            .collect()
    }

    /// Parsed stylesheet of a `<style>` element.
    pub fn style_sheet(&self, id: ArenaNodeId) -> Option<&Stylesheet> {
        self.style_sheets.get(&id)
    }

    /// Re-parse the sheet of `id` if it is a `<style>` element.
    pub fn refresh_style_sheet(&mut self, id: ArenaNodeId) {
        if !self.is_html_element_named(id, "style") {
            return;
        }
        let text: String = self
            .children(id)
            .filter_map(|child| self.text_content(child))
            .collect();
        self.style_sheets.insert(id, Stylesheet::parse(&text));
    }

    /// Replace the sheet of a `<style>` element with programmatic rules.
    ///
    /// The next change to the element's text re-parses it and drops these.
    pub fn set_style_sheet(&mut self, id: ArenaNodeId, sheet: Stylesheet) {
        self.style_sheets.insert(id, sheet);
    }

    /// Find the first node under the document matching a predicate (DFS).
    pub fn find<F>(&self, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(&ArenaNode) -> bool,
    {
        self.find_from(self.document, predicate)
    }

    /// Find the first node matching a predicate, starting at `root` (DFS).
    pub fn find_from<F>(&self, root: ArenaNodeId, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(&ArenaNode) -> bool,
    {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if predicate(node) {
                    return Some(id);
                }
                // Push children in reverse order for left-to-right traversal
                let mut children: Vec<_> = self.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }

    /// Find element by tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<ArenaNodeId> {
        self.find(|node| {
            if let ArenaNodeData::Element { name, .. } = &node.data {
                name.local.as_ref() == tag
            } else {
                false
            }
        })
    }

    /// First element under `root` whose id attribute is `id`.
    pub fn get_element_by_id(&self, root: ArenaNodeId, id: &str) -> Option<ArenaNodeId> {
        self.descendants(root)
            .find(|&node| self.element_id(node) == Some(id))
    }

    /// Every element in the arena, shadow trees included, in allocation order.
    pub fn all_elements(&self) -> impl Iterator<Item = ArenaNodeId> + '_ {
        (0..self.nodes.len() as u32)
            .map(ArenaNodeId)
            .filter(|&id| self.is_element(id))
    }

    pub(crate) fn node(&self, id: ArenaNodeId) -> &ArenaNode {
        &self.nodes[id.0 as usize]
    }
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

fn split_classes(value: &str) -> Vec<String> {
    value.split_whitespace().map(|s| s.to_string()).collect()
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
}

impl<'a> Iterator for ChildrenIter<'a> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(ArenaNodeId::NONE);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    dom: &'a ArenaDom,
    root: ArenaNodeId,
    next: Option<ArenaNodeId>,
    enter_templates: bool,
}

impl<'a> Descendants<'a> {
    fn new(dom: &'a ArenaDom, root: ArenaNodeId, enter_templates: bool) -> Self {
        let mut iter = Self {
            dom,
            root,
            next: None,
            enter_templates,
        };
        iter.next = iter.first_child(root);
        iter
    }

    fn first_child(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        if !self.enter_templates && self.dom.is_html_element_named(id, "template") {
            return None;
        }
        self.dom.get(id).and_then(|n| n.first_child.to_option())
    }

    fn successor(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        if let Some(child) = self.first_child(id) {
            return Some(child);
        }
        let mut current = id;
        while current != self.root {
            let node = self.dom.get(current)?;
            if node.next_sibling.is_some() {
                return Some(node.next_sibling);
            }
            current = node.parent.to_option()?;
        }
        None
    }
}

impl Iterator for Descendants<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.successor(current);
        Some(current)
    }
}

/// Convenience methods for element nodes.
impl ArenaDom {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: ArenaNodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Get element's namespace.
    pub fn element_namespace(&self, id: ArenaNodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    fn is_html_element_named(&self, id: ArenaNodeId, tag: &str) -> bool {
        self.get(id).is_some_and(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => {
                name.ns == ns!(html) && name.local.as_ref() == tag
            }
            _ => false,
        })
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: ArenaNodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, id: ArenaNodeId, attr_name: &str, value: &str) -> Result<()> {
        let Some(ArenaNodeData::Element {
            attrs, id: elem_id, classes, ..
        }) = self.get_mut(id).map(|n| &mut n.data)
        else {
            return Err(Error::NotAnElement(id));
        };

        match attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
            Some(attr) => attr.value = value.to_string(),
            None => attrs.push(Attribute::new(attr_name, value)),
        }
        match attr_name {
            "id" => *elem_id = Some(value.to_string()),
            "class" => *classes = split_classes(value),
            _ => {}
        }
        Ok(())
    }

    /// Remove an attribute. Returns the old value.
    pub fn remove_attr(&mut self, id: ArenaNodeId, attr_name: &str) -> Result<Option<String>> {
        let Some(ArenaNodeData::Element {
            attrs, id: elem_id, classes, ..
        }) = self.get_mut(id).map(|n| &mut n.data)
        else {
            return Err(Error::NotAnElement(id));
        };

        let Some(pos) = attrs.iter().position(|a| a.name.local.as_ref() == attr_name) else {
            return Ok(None);
        };
        let removed = attrs.remove(pos);
        match attr_name {
            "id" => *elem_id = None,
            "class" => classes.clear(),
            _ => {}
        }
        Ok(Some(removed.value))
    }

    /// Get element's id attribute.
    pub fn element_id(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    /// Get element's classes.
    pub fn element_classes(&self, id: ArenaNodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                ArenaNodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: ArenaNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, ArenaNodeData::Element { .. }))
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_qname(local: &str) -> QualName {
        QualName::new(None, ns!(html), LocalName::from(local))
    }

    #[test]
    fn test_create_elements() {
        let mut dom = ArenaDom::new();

        let div = dom.create_element(make_qname("div"), vec![Attribute::new("id", "main")]);
        dom.append(dom.document(), div);

        assert_eq!(dom.element_name(div).unwrap().as_ref(), "div");
        assert_eq!(dom.element_id(div), Some("main"));
        assert_eq!(dom.get_element_by_id(dom.document(), "main"), Some(div));
    }

    #[test]
    fn test_append_children() {
        let mut dom = ArenaDom::new();

        let parent = dom.create_element(make_qname("div"), vec![]);
        let child1 = dom.create_element(make_qname("p"), vec![]);
        let child2 = dom.create_element(make_qname("p"), vec![]);

        dom.append(dom.document(), parent);
        dom.append(parent, child1);
        dom.append(parent, child2);

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![child1, child2]);
    }

    #[test]
    fn test_append_moves_attached_node() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let div = dom.create_html_element("div", &[]);
        let style = dom.create_html_element("style", &[]);
        let p = dom.create_html_element("p", &[]);
        dom.append(doc, div);
        dom.append(div, style);
        dom.append(div, p);

        dom.append(p, style);

        assert_eq!(dom.children(div).collect::<Vec<_>>(), vec![p]);
        assert_eq!(dom.children(p).collect::<Vec<_>>(), vec![style]);
        assert_eq!(dom.parent_node(style), Some(p));
        assert_eq!(dom.descendants(doc).collect::<Vec<_>>(), vec![div, p, style]);
        assert_eq!(dom.style_elements(doc), vec![style]);
    }

    #[test]
    fn test_insert_before_moves_attached_node() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let a = dom.create_html_element("a", &[]);
        let b = dom.create_html_element("b", &[]);
        let c = dom.create_html_element("i", &[]);
        dom.append(doc, a);
        dom.append(doc, b);
        dom.append(doc, c);

        dom.insert_before(a, c);
        assert_eq!(dom.children(doc).collect::<Vec<_>>(), vec![c, a, b]);

        dom.insert_before(b, c);
        assert_eq!(dom.children(doc).collect::<Vec<_>>(), vec![a, c, b]);

        dom.insert_before(c, c);
        assert_eq!(dom.children(doc).collect::<Vec<_>>(), vec![a, c, b]);
        assert_eq!(dom.descendants(doc).count(), 3);
    }

    #[test]
    fn test_text_merging() {
        let mut dom = ArenaDom::new();

        let p = dom.create_element(make_qname("p"), vec![]);
        dom.append(dom.document(), p);

        dom.append_text(p, "Hello, ");
        dom.append_text(p, "World!");

        let children: Vec<_> = dom.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(dom.text_content(children[0]), Some("Hello, World!"));
    }

    #[test]
    fn test_connectedness_crosses_shadow_roots() {
        let mut dom = ArenaDom::new();
        let host = dom.create_html_element("div", &[]);
        let inner = dom.create_html_element("span", &[]);
        let root = dom.attach_shadow(host, ShadowRootMode::Open).unwrap();
        dom.append(root, inner);

        assert!(!dom.is_connected(inner));
        dom.append(dom.document(), host);
        assert!(dom.is_connected(inner));
        assert_eq!(dom.parent_node(root), None);
        assert_eq!(dom.shadow_host(root), Some(host));
        assert_eq!(dom.root_node(inner), root);
    }

    #[test]
    fn test_template_contents_not_connected() {
        let mut dom = ArenaDom::new();
        let template = dom.create_html_element("template", &[]);
        let div = dom.create_html_element("div", &[]);
        let span = dom.create_html_element("span", &[]);
        dom.append(dom.document(), template);
        dom.append(template, div);
        dom.append(div, span);

        assert!(dom.is_connected(template));
        assert!(!dom.is_connected(div));
        assert!(!dom.is_connected(span));
    }

    #[test]
    fn test_shadow_including_order_ignores_allocation_order() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let inner = dom.create_html_element("span", &[]);
        let light = dom.create_html_element("p", &[]);
        let host = dom.create_html_element("div", &[]);
        let first = dom.create_html_element("a", &[]);
        let template = dom.create_html_element("template", &[]);
        let inert = dom.create_html_element("b", &[]);
        dom.append(doc, host);
        dom.append(host, light);
        dom.insert_before(host, first);
        dom.append(doc, template);
        dom.append(template, inert);
        let root = dom.attach_shadow(host, ShadowRootMode::Open).unwrap();
        dom.append(root, inner);

        assert_eq!(
            dom.shadow_including_descendants(doc),
            vec![first, host, root, inner, light, template]
        );
    }

    #[test]
    fn test_attach_shadow_twice_fails() {
        let mut dom = ArenaDom::new();
        let host = dom.create_html_element("div", &[]);
        dom.attach_shadow(host, ShadowRootMode::Open).unwrap();

        assert!(matches!(
            dom.attach_shadow(host, ShadowRootMode::Closed),
            Err(Error::ShadowRootAlreadyAttached(id)) if id == host
        ));
        let text = dom.create_text("x".to_string());
        assert!(matches!(
            dom.attach_shadow(text, ShadowRootMode::Open),
            Err(Error::NotAnElement(_))
        ));
    }

    #[test]
    fn test_style_elements_are_scoped() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let outer_style = dom.create_html_element("style", &[]);
        let host = dom.create_html_element("div", &[]);
        let template = dom.create_html_element("template", &[]);
        let inert_style = dom.create_html_element("style", &[]);
        dom.append(doc, outer_style);
        dom.append(doc, host);
        dom.append(doc, template);
        dom.append(template, inert_style);

        let root = dom.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let inner_style = dom.create_html_element("style", &[]);
        dom.append(root, inner_style);

        assert_eq!(dom.style_elements(doc), vec![outer_style]);
        assert_eq!(dom.style_elements(root), vec![inner_style]);
    }

    #[test]
    fn test_style_sheet_follows_text_changes() {
        let mut dom = ArenaDom::new();
        let style = dom.create_html_element("style", &[]);
        dom.append(dom.document(), style);
        dom.append_text(style, "p { color: red; }");
        assert_eq!(dom.style_sheet(style).map(|s| s.rules.len()), Some(1));

        dom.set_text_content(style, "p { color: red; } div { margin: 0; }");
        assert_eq!(dom.style_sheet(style).map(|s| s.rules.len()), Some(2));

        dom.set_text_content(style, "");
        assert_eq!(dom.style_sheet(style).map(|s| s.rules.len()), Some(0));
    }

    #[test]
    fn test_set_and_remove_attr_updates_caches() {
        let mut dom = ArenaDom::new();
        let div = dom.create_html_element("div", &[("class", "a")]);

        dom.set_attr(div, "class", "b c").unwrap();
        dom.set_attr(div, "id", "x").unwrap();
        assert_eq!(dom.element_classes(div), ["b".to_string(), "c".to_string()]);
        assert_eq!(dom.element_id(div), Some("x"));

        assert_eq!(dom.remove_attr(div, "id").unwrap(), Some("x".to_string()));
        assert_eq!(dom.element_id(div), None);
        assert_eq!(dom.remove_attr(div, "id").unwrap(), None);
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut dom = ArenaDom::new();
        let a = dom.create_html_element("a", &[]);
        let b = dom.create_html_element("b", &[]);
        let c = dom.create_html_element("i", &[]);
        let d = dom.create_html_element("u", &[]);
        dom.append(dom.document(), a);
        dom.append(a, b);
        dom.append(b, c);
        dom.append(a, d);

        let order: Vec<_> = dom.descendants(dom.document()).collect();
        assert_eq!(order, vec![a, b, c, d]);
        let order: Vec<_> = dom.descendants(b).collect();
        assert_eq!(order, vec![c]);
    }
}
