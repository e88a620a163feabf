//! In-memory host.
//!
//! [`MemoryDom`] is a small element tree with attributes, inline styles,
//! text nodes, listeners and a title slot. It counts every mutating call,
//! which is how tests observe that an unchanged value never reaches the
//! host.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::{Event, Host, Listener};

enum Kind {
    Element(String),
    Text,
}

struct DomNodeInner {
    kind: Kind,
    attributes: RefCell<IndexMap<String, String>>,
    style: RefCell<IndexMap<String, String>>,
    text: RefCell<String>,
    children: RefCell<Vec<DomNode>>,
    parent: RefCell<Weak<DomNodeInner>>,
    listeners: RefCell<Vec<(String, Listener)>>,
}

/// A node handle, compared by identity.
#[derive(Clone)]
pub struct DomNode(Rc<DomNodeInner>);

impl DomNode {
    fn new(kind: Kind, text: &str) -> Self {
        Self(Rc::new(DomNodeInner {
            kind,
            attributes: RefCell::new(IndexMap::new()),
            style: RefCell::new(IndexMap::new()),
            text: RefCell::new(text.to_owned()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            listeners: RefCell::new(Vec::new()),
        }))
    }

    /// A detached element, usually a mount container.
    pub fn element(tag: &str) -> Self {
        Self::new(Kind::Element(tag.to_owned()), "")
    }

    /// A detached text node.
    pub fn text(text: &str) -> Self {
        Self::new(Kind::Text, text)
    }

    /// Tag name, `None` for text nodes.
    pub fn tag(&self) -> Option<String> {
        match &self.0.kind {
            Kind::Element(tag) => Some(tag.clone()),
            Kind::Text => None,
        }
    }

    /// Whether this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self.0.kind, Kind::Text)
    }

    /// Current value of an attribute. Bare attributes read as `""`.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    /// Whether `name` is set.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.0.attributes.borrow().contains_key(name)
    }

    /// Attribute names in the order they were first set.
    pub fn attribute_names(&self) -> Vec<String> {
        self.0.attributes.borrow().keys().cloned().collect()
    }

    /// Inline style value of a property, under the name the renderer wrote.
    pub fn style(&self, property: &str) -> Option<String> {
        self.0.style.borrow().get(property).cloned()
    }

    /// Own text of a text node.
    pub fn data(&self) -> String {
        self.0.text.borrow().clone()
    }

    /// Concatenated text of the whole subtree.
    pub fn text_content(&self) -> String {
        match self.0.kind {
            Kind::Text => self.data(),
            Kind::Element(_) => self.children().iter().map(DomNode::text_content).collect(),
        }
    }

    /// Child nodes, in order.
    pub fn children(&self) -> Vec<DomNode> {
        self.0.children.borrow().clone()
    }

    /// Parent node, `None` when detached.
    pub fn parent(&self) -> Option<DomNode> {
        self.0.parent.borrow().upgrade().map(DomNode)
    }

    /// Fire every listener of `event.kind()`, in registration order.
    pub fn dispatch(&self, event: &Event) {
        let listeners: Vec<Listener> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|(kind, _)| kind == event.kind())
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// First element with `tag` in document order, including `self`.
    pub fn find(&self, tag: &str) -> Option<DomNode> {
        if self.tag().as_deref() == Some(tag) {
            return Some(self.clone());
        }
        self.children().iter().find_map(|child| child.find(tag))
    }

    /// Serialized markup, for assertions.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match &self.0.kind {
            Kind::Text => out.push_str(&self.0.text.borrow()),
            Kind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in self.0.attributes.borrow().iter() {
                    if value.is_empty() {
                        out.push_str(&format!(" {name}"));
                    } else {
                        out.push_str(&format!(" {name}=\"{value}\""));
                    }
                }
                let style = self.0.style.borrow();
                if !style.is_empty() {
                    let css: String = style.iter().map(|(k, v)| format!("{k}:{v};")).collect();
                    out.push_str(&format!(" style=\"{css}\""));
                }
                out.push('>');
                for child in self.0.children.borrow().iter() {
                    child.write_html(out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
}

impl PartialEq for DomNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DomNode {}

impl Hash for DomNode {
    fn hash<S: Hasher>(&self, state: &mut S) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for DomNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            Kind::Element(tag) => write!(f, "<{tag}>"),
            Kind::Text => write!(f, "{:?}", self.0.text.borrow()),
        }
    }
}

/// The in-memory host.
#[derive(Debug, Default)]
pub struct MemoryDom {
    title: RefCell<String>,
    mutations: Cell<usize>,
}

impl MemoryDom {
    /// An empty host with no title and a zeroed mutation counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current document title.
    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    /// Number of mutating host calls so far.
    pub fn mutations(&self) -> usize {
        self.mutations.get()
    }

    fn bump(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }
}

impl Host for MemoryDom {
    type Node = DomNode;

    fn create_element(&self, tag: &str) -> DomNode {
        DomNode::element(tag)
    }

    fn create_text(&self, text: &str) -> DomNode {
        DomNode::text(text)
    }

    fn set_text(&self, node: &DomNode, text: &str) {
        self.bump();
        *node.0.text.borrow_mut() = text.to_owned();
    }

    fn set_attribute(&self, node: &DomNode, name: &str, value: &str) {
        self.bump();
        node.0
            .attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    fn get_attribute(&self, node: &DomNode, name: &str) -> Option<String> {
        node.attribute(name)
    }

    fn remove_attribute(&self, node: &DomNode, name: &str) {
        self.bump();
        node.0.attributes.borrow_mut().shift_remove(name);
    }

    fn set_style(&self, node: &DomNode, property: &str, value: &str) {
        self.bump();
        node.0
            .style
            .borrow_mut()
            .insert(property.to_owned(), value.to_owned());
    }

    fn remove_style(&self, node: &DomNode, property: &str) {
        self.bump();
        node.0.style.borrow_mut().shift_remove(property);
    }

    fn append_child(&self, parent: &DomNode, child: &DomNode) {
        self.bump();
        if let Some(previous) = child.parent() {
            previous.0.children.borrow_mut().retain(|c| c != child);
        }
        *child.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
        parent.0.children.borrow_mut().push(child.clone());
    }

    fn remove_child(&self, parent: &DomNode, child: &DomNode) {
        self.bump();
        parent.0.children.borrow_mut().retain(|c| c != child);
        if child.parent().as_ref() == Some(parent) {
            *child.0.parent.borrow_mut() = Weak::new();
        }
    }

    fn first_child(&self, parent: &DomNode) -> Option<DomNode> {
        parent.0.children.borrow().first().cloned()
    }

    fn add_event_listener(&self, node: &DomNode, kind: &str, listener: Listener) {
        node.0
            .listeners
            .borrow_mut()
            .push((kind.to_owned(), listener));
    }

    fn set_title(&self, title: &str) {
        self.bump();
        *self.title.borrow_mut() = title.to_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_operations() {
        let dom = MemoryDom::new();
        let root = DomNode::element("div");
        let span = dom.create_element("span");
        let text = dom.create_text("hi");

        dom.append_child(&root, &span);
        dom.append_child(&span, &text);
        assert_eq!(root.text_content(), "hi");
        assert_eq!(root.find("span"), Some(span.clone()));
        assert_eq!(text.parent(), Some(span.clone()));

        dom.remove_child(&root, &span);
        assert!(dom.first_child(&root).is_none());
        assert!(span.parent().is_none());
    }

    #[test]
    fn markup_and_mutation_count() {
        let dom = MemoryDom::new();
        let node = dom.create_element("input");
        dom.set_attribute(&node, "type", "checkbox");
        dom.set_attribute(&node, "checked", "");
        dom.set_style(&node, "display", "none");

        assert_eq!(
            node.to_html(),
            r#"<input type="checkbox" checked style="display:none;"></input>"#
        );
        assert_eq!(dom.mutations(), 3);
    }

    #[test]
    fn listeners_fire_by_kind() {
        let dom = MemoryDom::new();
        let node = dom.create_element("button");
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        dom.add_event_listener(&node, "click", Rc::new(move |_: &Event| hits_clone.set(hits_clone.get() + 1)));

        node.dispatch(&Event::new("click"));
        node.dispatch(&Event::new("input"));
        assert_eq!(hits.get(), 1);
    }
}
