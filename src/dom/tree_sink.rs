//! html5ever `TreeSink` that builds an [`ArenaDom`].
//!
//! Template contents are appended to the template element itself; declarative
//! shadow roots are promoted after parsing by
//! [`ArenaDom::promote_declarative_shadow_roots`].

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId, Attribute};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle(pub ArenaNodeId);

pub struct ArenaSink {
    dom: RefCell<ArenaDom>,
}

impl ArenaSink {
    pub fn new() -> Self {
        Self {
            dom: RefCell::new(ArenaDom::new()),
        }
    }

    pub fn into_dom(self) -> ArenaDom {
        self.dom.into_inner()
    }

    fn insert(&self, parent: ArenaNodeId, child: NodeOrText<NodeHandle>) {
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => dom.append(parent, node.0),
            NodeOrText::AppendText(text) => dom.append_text(parent, &text),
        }
    }
}

impl TreeSink for ArenaSink {
    type Handle = NodeHandle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        log::trace!("html parse error: {msg}");
    }

    fn get_document(&self) -> Self::Handle {
        NodeHandle(self.dom.borrow().document())
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let dom = self.dom.borrow();
        match dom.get(target.0).map(|n| &n.data) {
            // SAFETY: the tree builder drops the name before its next sink
            // call, and only sink calls can grow (and move) the arena.
            Some(ArenaNodeData::Element { name, .. }) => unsafe {
                std::mem::transmute::<&QualName, &'a QualName>(name)
            },
            _ => &EMPTY,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs
            .into_iter()
            .map(|a| Attribute {
                name: a.name,
                value: a.value.to_string(),
            })
            .collect();
        NodeHandle(self.dom.borrow_mut().create_element(name, attrs))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        NodeHandle(self.dom.borrow_mut().create_comment(text.to_string()))
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        NodeHandle(self.dom.borrow_mut().create_comment(String::new()))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        self.insert(parent.0, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let parent = self.dom.borrow().parent_node(element.0);
        match parent {
            Some(parent) => self.insert(parent, child),
            None => self.insert(prev_element.0, child),
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let mut dom = self.dom.borrow_mut();
        let doctype = dom.create_doctype(
            name.to_string(),
            public_id.to_string(),
            system_id.to_string(),
        );
        let doc = dom.document();
        dom.append(doc, doctype);
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        log::trace!("document quirks mode: {mode:?}");
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut dom = self.dom.borrow_mut();
        let node = match new_node {
            NodeOrText::AppendNode(node) => node.0,
            NodeOrText::AppendText(text) => dom.create_text(text.to_string()),
        };
        dom.insert_before(sibling.0, node);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Html5Attribute>) {
        let mut dom = self.dom.borrow_mut();
        for attr in attrs {
            let local = attr.name.local.as_ref();
            if dom.get_attr(target.0, local).is_some() {
                continue;
            }
            if let Err(e) = dom.set_attr(target.0, local, &attr.value) {
                log::trace!("dropped attribute {local}: {e}");
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.dom.borrow_mut().detach(target.0);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut dom = self.dom.borrow_mut();
        let children: Vec<_> = dom.children(node.0).collect();
        for child in children {
            dom.append(new_parent.0, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn html_attr(name: &str, value: &str) -> Html5Attribute {
        Html5Attribute {
            name: QualName::new(None, html5ever::ns!(), name.into()),
            value: value.into(),
        }
    }

    #[test]
    fn test_basic_parse() {
        let dom = parse_html("<html><body><p>Hello</p></body></html>");

        let p = dom.find_by_tag("p").expect("should find p");
        let text_id = dom.children(p).next().expect("p should have child");
        assert_eq!(dom.text_content(text_id), Some("Hello"));
    }

    #[test]
    fn test_attributes() {
        let dom = parse_html(r#"<div id="main" class="container header" style="color: red">x</div>"#);

        let div = dom.find_by_tag("div").expect("should find div");
        assert_eq!(dom.element_id(div), Some("main"));
        assert_eq!(dom.get_attr(div, "style"), Some("color: red"));

        let classes = dom.element_classes(div);
        assert!(classes.contains(&"container".to_string()));
        assert!(classes.contains(&"header".to_string()));
    }

    #[test]
    fn test_repeated_body_adds_missing_attrs() {
        let dom = parse_html(r#"<body class="a"><p>x</p><body id="b" class="c">"#);

        let body = dom.find_by_tag("body").expect("should find body");
        assert_eq!(dom.get_attr(body, "class"), Some("a"));
        assert_eq!(dom.element_id(body), Some("b"));
    }

    #[test]
    fn test_missing_attrs_on_non_element_are_dropped() {
        let sink = ArenaSink::new();
        let comment = sink.create_comment("c".into());
        sink.add_attrs_if_missing(&comment, vec![html_attr("id", "x")]);

        let dom = sink.into_dom();
        assert!(!dom.is_element(comment.0));
        assert_eq!(dom.get_attr(comment.0, "id"), None);
    }

    #[test]
    fn test_misnested_formatting_is_moved() {
        let dom = parse_html("<body><b>1<p>2</b>3</p></body>");

        let body = dom.find_by_tag("body").unwrap();
        let children: Vec<_> = dom.children(body).collect();
        let names: Vec<_> = children
            .iter()
            .map(|&id| dom.element_name(id).unwrap().as_ref().to_string())
            .collect();
        assert_eq!(names, ["b", "p"]);

        let inner = dom.children(children[1]).next().unwrap();
        assert_eq!(dom.element_name(inner).unwrap().as_ref(), "b");
        assert_eq!(dom.descendants(body).count(), 6);
    }

    #[test]
    fn test_style_element_sheet_is_parsed() {
        let dom = parse_html("<head><style>p { color: red; } em { color: blue; }</style></head>");

        let style = dom.find_by_tag("style").expect("should find style");
        let sheet = dom.style_sheet(style).expect("style element has a sheet");
        assert_eq!(sheet.rules.len(), 2);
    }

    #[test]
    fn test_declarative_shadow_root() {
        let dom = parse_html(
            r#"<div id="host"><template shadowrootmode="open"><p id="inner">in</p></template><p id="light">out</p></div>"#,
        );

        let host = dom.get_element_by_id(dom.document(), "host").unwrap();
        let root = dom.shadow_root(host).expect("template promoted to shadow root");
        assert!(dom.find_by_tag("template").is_none());

        let inner = dom.get_element_by_id(root, "inner").unwrap();
        assert_eq!(dom.parent_node(inner), Some(root));
        assert!(dom.is_connected(inner));
        assert!(dom.get_element_by_id(dom.document(), "inner").is_none());
        assert!(dom.get_element_by_id(dom.document(), "light").is_some());
    }

    #[test]
    fn test_only_first_declarative_template_is_promoted() {
        let dom = parse_html(
            r#"<div id="host"><template shadowrootmode="open"><b>1</b></template><template shadowrootmode="closed"><i>2</i></template></div>"#,
        );

        let host = dom.get_element_by_id(dom.document(), "host").unwrap();
        assert!(dom.shadow_root(host).is_some());
        assert!(dom.find_by_tag("template").is_some());
    }

    #[test]
    fn test_plain_template_stays_inert() {
        let dom = parse_html(r#"<div id="host"><template><b id="b">x</b></template></div>"#);
        let host = dom.get_element_by_id(dom.document(), "host").unwrap();
        assert!(dom.shadow_root(host).is_none());

        let b = dom.find_by_tag("b").unwrap();
        assert!(!dom.is_connected(b));
    }
}
