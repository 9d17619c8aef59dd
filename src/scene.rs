//! Scene graph seam for vector output.
//!
//! The grid renderer builds pattern definitions as [`Element`] trees and
//! hands them to a [`SceneGraph`] by id. [`SvgDocument`] is the in-memory
//! implementation that serialises to a standalone SVG file.

use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

pub type NodeRef = Rc<RefCell<Element>>;

/// A vector element: tag name, ordered attributes, children
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<NodeRef>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Builder form of `set_attr`
    pub fn attr(mut self, key: &str, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder form of `push`
    pub fn child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Rc::new(RefCell::new(child)));
    }

    /// Set an attribute, replacing in place if it already exists
    pub fn set_attr(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn into_node(self) -> NodeRef {
        Rc::new(RefCell::new(self))
    }

    /// Apply `f` to every descendant (not self) with the given tag name
    pub fn for_each_named(&self, name: &str, f: &mut dyn FnMut(&mut Element)) {
        for child in &self.children {
            let mut child = child.borrow_mut();
            if child.name == name {
                f(&mut *child);
            }
            child.for_each_named(name, f);
        }
    }

    fn write_svg(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{}<{}", indent, self.name);
        for (key, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", key, escape(value));
        }
        if self.children.is_empty() {
            out.push_str("/>\n");
            return;
        }
        out.push_str(">\n");
        for child in &self.children {
            child.borrow().write_svg(out, depth + 1);
        }
        let _ = writeln!(out, "{}</{}>", indent, self.name);
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Definition container addressed by element id
pub trait SceneGraph {
    /// Attach a node under `id`, replacing any node already there
    fn attach(&mut self, id: &str, node: NodeRef);
    fn detach(&mut self, id: &str) -> Option<NodeRef>;
    fn contains(&self, id: &str) -> bool;
    fn get(&self, id: &str) -> Option<NodeRef>;
}

/// Standalone SVG document: a `defs` block plus body elements
#[derive(Debug, Default)]
pub struct SvgDocument {
    width: Option<String>,
    height: Option<String>,
    view_box: Option<[f64; 4]>,
    defs: Vec<(String, NodeRef)>,
    body: Vec<NodeRef>,
}

impl SvgDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(width: impl ToString, height: impl ToString) -> Self {
        Self {
            width: Some(width.to_string()),
            height: Some(height.to_string()),
            ..Self::default()
        }
    }

    pub fn set_size(&mut self, width: impl ToString, height: impl ToString) {
        self.width = Some(width.to_string());
        self.height = Some(height.to_string());
    }

    /// User coordinate window: min x, min y, width, height
    pub fn set_view_box(&mut self, min_x: f64, min_y: f64, width: f64, height: f64) {
        self.view_box = Some([min_x, min_y, width, height]);
    }

    pub fn add_to_body(&mut self, node: NodeRef) {
        self.body.push(node);
    }

    pub fn clear_body(&mut self) {
        self.body.clear();
    }

    /// Ids currently defined, in attachment order
    pub fn def_ids(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(|(id, _)| id.as_str())
    }

    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        out.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\"");
        if let Some(width) = &self.width {
            let _ = write!(out, " width=\"{}\"", escape(width));
        }
        if let Some(height) = &self.height {
            let _ = write!(out, " height=\"{}\"", escape(height));
        }
        if let Some([x, y, w, h]) = self.view_box {
            let _ = write!(out, " viewBox=\"{} {} {} {}\"", x, y, w, h);
        }
        out.push_str(">\n");

        out.push_str("  <defs>\n");
        for (_, node) in &self.defs {
            node.borrow().write_svg(&mut out, 2);
        }
        out.push_str("  </defs>\n");

        for node in &self.body {
            node.borrow().write_svg(&mut out, 1);
        }
        out.push_str("</svg>\n");
        out
    }
}

impl SceneGraph for SvgDocument {
    fn attach(&mut self, id: &str, node: NodeRef) {
        match self.defs.iter_mut().find(|(k, _)| k == id) {
            Some((_, existing)) => *existing = node,
            None => self.defs.push((id.to_string(), node)),
        }
    }

    fn detach(&mut self, id: &str) -> Option<NodeRef> {
        let index = self.defs.iter().position(|(k, _)| k == id)?;
        Some(self.defs.remove(index).1)
    }

    fn contains(&self, id: &str) -> bool {
        self.defs.iter().any(|(k, _)| k == id)
    }

    fn get(&self, id: &str) -> Option<NodeRef> {
        self.defs
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, node)| Rc::clone(node))
    }
}
