//! Display tree: the rendered form of a page before it becomes HTML.
//!
//! A [`Node`] is an element tag, an ordered attribute map, and ordered
//! children. Trees are rebuilt on every render and owned by whoever asked for
//! them; they compare structurally, which is what makes render output easy to
//! assert on.
//!
//! Serialization goes through [`maud::Render`], so a tree drops straight into
//! an `html!` template and gets maud's escaping for text and attribute values.
//! The special [`FRAGMENT`] tag groups children without emitting an element.

use maud::Render;
use serde::Serialize;
use std::collections::BTreeMap;

/// Tag of a node that renders only its children.
pub const FRAGMENT: &str = "fragment";

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "wbr"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Child {
    Element(Node),
    Text(String),
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Element(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub tag: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Child>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn fragment(children: Vec<Child>) -> Self {
        Self {
            tag: FRAGMENT.to_string(),
            attrs: BTreeMap::new(),
            children,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Child>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn is_fragment(&self) -> bool {
        self.tag == FRAGMENT
    }

    /// Concatenated text of all descendants, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Depth-first search for the first node with `tag` (including `self`).
    pub fn find(&self, tag: &str) -> Option<&Node> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            Child::Element(node) => node.find(tag),
            Child::Text(_) => None,
        })
    }

    /// All nodes with `tag`, depth-first.
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.find_all_into(tag, &mut found);
        found
    }

    fn find_all_into<'a>(&'a self, tag: &str, found: &mut Vec<&'a Node>) {
        if self.tag == tag {
            found.push(self);
        }
        for child in &self.children {
            if let Child::Element(node) = child {
                node.find_all_into(tag, found);
            }
        }
    }

    /// Number of element nodes in the tree, `self` included.
    pub fn count_nodes(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| match child {
                Child::Element(node) => node.count_nodes(),
                Child::Text(_) => 0,
            })
            .sum::<usize>()
    }
}

fn collect_text(children: &[Child], out: &mut String) {
    for child in children {
        match child {
            Child::Text(text) => out.push_str(text),
            Child::Element(node) => collect_text(&node.children, out),
        }
    }
}

impl Render for Node {
    fn render_to(&self, buffer: &mut String) {
        if self.is_fragment() {
            for child in &self.children {
                child.render_to(buffer);
            }
            return;
        }

        buffer.push('<');
        buffer.push_str(&self.tag);
        for (name, value) in &self.attrs {
            buffer.push(' ');
            buffer.push_str(name);
            buffer.push_str("=\"");
            value.as_str().render_to(buffer);
            buffer.push('"');
        }
        buffer.push('>');

        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }
        for child in &self.children {
            child.render_to(buffer);
        }
        buffer.push_str("</");
        buffer.push_str(&self.tag);
        buffer.push('>');
    }
}

impl Render for Child {
    fn render_to(&self, buffer: &mut String) {
        match self {
            Child::Element(node) => node.render_to(buffer),
            Child::Text(text) => text.as_str().render_to(buffer),
        }
    }
}

/// A rendered page body, ready for a layout shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayTree {
    root: Node,
}

impl DisplayTree {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Build a tree from top-level children: a single element becomes the
    /// root, anything else is grouped under a fragment.
    pub fn from_children(mut children: Vec<Child>) -> Self {
        let single = children.len() == 1;
        let root = match children.pop() {
            Some(Child::Element(node)) if single => node,
            last => {
                children.extend(last);
                Node::fragment(children)
            }
        };
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn to_html(&self) -> String {
        self.root.render().into_string()
    }
}

impl Render for DisplayTree {
    fn render_to(&self, buffer: &mut String) {
        self.root.render_to(buffer);
    }
}
