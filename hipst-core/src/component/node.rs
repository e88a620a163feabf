//! Component nodes.
//!
//! A [`Component`] is a cheap handle (`Rc`) on one node of the UI graph. It
//! owns its stores, its child list and its event table. Structural links
//! upward are weak: a node never keeps its parent alive, and the root is
//! found by walking the parent chain.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use tracing::warn;

use crate::error::{Error, Result};
use crate::reactive::{Dependencies, Key};
use crate::render::Event;

use super::blueprint::Operations;
use super::{Bag, BagKind, Child, ChildList, Context, Events, Slot, Store, Value};

/// Tag of the node created by [`Document::new`](super::Document::new).
pub const DOCUMENT_TAG: &str = "__document__";

/// A user side effect, wrapped in an effect at mount time.
pub type SideEffect = Rc<dyn Fn(&Context)>;

/// Unique identifier for a component node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(u64);

impl ComponentId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// The reactive slot holding call-time arguments.
#[derive(Default)]
pub(crate) struct Args {
    pub(crate) deps: Dependencies,
    pub(crate) values: RefCell<Vec<Value>>,
}

/// Title and meta declarations of a document root.
#[derive(Default)]
pub(crate) struct Head {
    deps: Dependencies,
    title: RefCell<Option<Slot>>,
    metas: RefCell<IndexMap<String, Slot>>,
}

impl Head {
    /// Tracked, resolved title. `None` when no title was declared.
    pub(crate) fn title(&self, ctx: &Context) -> Option<Value> {
        self.deps.track("title");
        let slot = self.title.borrow().clone();
        slot.map(|slot| slot.resolve(ctx))
    }

    pub(crate) fn set_title(&self, slot: Slot) {
        *self.title.borrow_mut() = Some(slot);
        self.deps.trigger("title");
    }

    pub(crate) fn metas(&self) -> Vec<(String, Slot)> {
        self.deps.track("meta");
        self.metas
            .borrow()
            .iter()
            .map(|(name, slot)| (name.clone(), slot.clone()))
            .collect()
    }

    pub(crate) fn set_meta(&self, name: &str, slot: Slot) {
        self.metas.borrow_mut().insert(name.to_owned(), slot);
        self.deps.trigger("meta");
    }
}

pub(crate) struct ComponentInner {
    id: ComponentId,
    tag: String,
    state: Store,
    styles: Store,
    attributes: Store,
    children: ChildList,
    events: Events,
    side_effects: RefCell<Vec<SideEffect>>,
    args: Args,
    parent: RefCell<Weak<ComponentInner>>,
    operations: RefCell<Rc<Operations>>,
    head: Option<Head>,
}

/// A node of the component graph.
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

impl Component {
    /// Create a detached node for `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self::build(tag.into(), None)
    }

    pub(crate) fn document() -> Self {
        Self::build(DOCUMENT_TAG.to_owned(), Some(Head::default()))
    }

    fn build(tag: String, head: Option<Head>) -> Self {
        Self {
            inner: Rc::new(ComponentInner {
                id: ComponentId::new(),
                tag,
                state: Store::new(false),
                styles: Store::new(true),
                attributes: Store::new(true),
                children: ChildList::default(),
                events: Events::default(),
                side_effects: RefCell::new(Vec::new()),
                args: Args::default(),
                parent: RefCell::new(Weak::new()),
                operations: RefCell::new(Rc::default()),
                head,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Identity & structure
    // ------------------------------------------------------------------

    /// Unique id of this component.
    pub fn component_id(&self) -> ComponentId {
        self.inner.id
    }

    /// Element tag.
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// Whether this node is a document root (title/meta, children mounted
    /// straight into the container).
    pub fn is_document(&self) -> bool {
        self.inner.head.is_some()
    }

    pub(crate) fn head(&self) -> Option<&Head> {
        self.inner.head.as_ref()
    }

    /// Current parent, if attached.
    pub fn parent(&self) -> Option<Component> {
        self.inner
            .parent
            .borrow()
            .upgrade()
            .map(|inner| Component { inner })
    }

    /// The top-most ancestor, or `self` when detached.
    pub fn root(&self) -> Component {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    fn is_ancestor_or_self(&self, candidate: &Component) -> bool {
        let mut node = Some(self.clone());
        while let Some(current) = node {
            if current == *candidate {
                return true;
            }
            node = current.parent();
        }
        false
    }

    /// A fresh rendering context for this node.
    pub fn context(&self) -> Context {
        Context::new(self.clone())
    }

    // ------------------------------------------------------------------
    // Stores
    // ------------------------------------------------------------------

    /// State bag, resolved against this component's context.
    pub fn state(&self) -> Bag {
        Bag::new(self.context(), BagKind::State)
    }

    /// Inline style bag.
    pub fn styles(&self) -> Bag {
        Bag::new(self.context(), BagKind::Styles)
    }

    /// Attribute bag.
    pub fn attributes(&self) -> Bag {
        Bag::new(self.context(), BagKind::Attributes)
    }

    pub(crate) fn store(&self, kind: BagKind) -> &Store {
        match kind {
            BagKind::State => &self.inner.state,
            BagKind::Styles => &self.inner.styles,
            BagKind::Attributes => &self.inner.attributes,
        }
    }

    // ------------------------------------------------------------------
    // Children
    // ------------------------------------------------------------------

    /// The tracked child list.
    pub fn child_list(&self) -> &ChildList {
        &self.inner.children
    }

    /// Tracked copy of the child list.
    pub fn children(&self) -> Vec<Child> {
        self.inner.children.snapshot()
    }

    /// The `index`-th child if it is a component. Tracked.
    pub fn nth(&self, index: usize) -> Option<Component> {
        self.children()
            .into_iter()
            .nth(index)
            .and_then(|child| child.as_node().cloned())
    }

    fn adopt(&self, node: &Component) -> Result<()> {
        if self.is_ancestor_or_self(node) {
            return Err(Error::Cycle {
                tag: node.tag().to_owned(),
            });
        }
        if let Some(previous) = node.parent() {
            previous.inner.children.remove_node(node);
        }
        *node.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        Ok(())
    }

    /// Append a child. A component child is detached from its previous
    /// parent first.
    pub fn append(&self, child: impl Into<Child>) -> Result<()> {
        let child = child.into();
        if let Child::Node(node) = &child {
            self.adopt(node)?;
        }
        self.inner.children.push(child);
        Ok(())
    }

    /// Replace the whole child list at once.
    pub fn replace_children<I, C>(&self, children: I) -> Result<()>
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        let children: Vec<Child> = children.into_iter().map(Into::into).collect();

        for node in children.iter().filter_map(Child::as_node) {
            if self.is_ancestor_or_self(node) {
                return Err(Error::Cycle {
                    tag: node.tag().to_owned(),
                });
            }
        }

        for node in children.iter().filter_map(Child::as_node) {
            if let Some(previous) = node.parent() {
                if previous != *self {
                    previous.inner.children.remove_node(node);
                }
            }
            *node.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        }

        let old = self.inner.children.replace(children.clone());

        for node in old.iter().filter_map(Child::as_node) {
            let kept = children.iter().any(|child| child.as_node() == Some(node));
            if !kept && node.parent().as_ref() == Some(self) {
                *node.inner.parent.borrow_mut() = Weak::new();
            }
        }
        Ok(())
    }

    /// Detach every child. Triggers `List` once.
    pub fn clear_children(&self) {
        let old = self.inner.children.replace(Vec::new());
        for node in old.iter().filter_map(Child::as_node) {
            *node.inner.parent.borrow_mut() = Weak::new();
        }
    }

    // ------------------------------------------------------------------
    // Events & side effects
    // ------------------------------------------------------------------

    /// Registered event handlers.
    pub fn events(&self) -> &Events {
        &self.inner.events
    }

    /// Register an event handler on an existing node.
    ///
    /// The renderer binds one host listener per event kind when the node is
    /// mounted. A handler for a kind that was already bound is picked up
    /// immediately; a kind first seen after mount stays unbound until the
    /// tree is mounted again.
    pub fn add_handler(&self, kind: &str, handler: impl Fn(&Context, &Event) + 'static) {
        self.inner.events.add(kind, Rc::new(handler));
    }

    /// Register a side effect on an existing node.
    pub fn add_side_effect(&self, f: impl Fn(&Context) + 'static) {
        self.inner.side_effects.borrow_mut().push(Rc::new(f));
    }

    /// Declared side effects, in declaration order.
    pub fn side_effects(&self) -> Vec<SideEffect> {
        self.inner.side_effects.borrow().clone()
    }

    // ------------------------------------------------------------------
    // Call-time arguments & operations
    // ------------------------------------------------------------------

    pub(crate) fn args_slot(&self) -> &Args {
        &self.inner.args
    }

    /// Tracked copy of the call-time arguments.
    pub fn args(&self) -> Vec<Value> {
        self.inner.args.deps.track(Key::Args);
        self.inner.args.values.borrow().clone()
    }

    /// Replace the call-time arguments, re-running everything that read them.
    pub fn invoke<I, V>(&self, args: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let args: Vec<Value> = args.into_iter().map(Into::into).collect();
        *self.inner.args.values.borrow_mut() = args;
        self.inner.args.deps.trigger(Key::Args);
    }

    pub(crate) fn set_operations(&self, operations: Rc<Operations>) {
        *self.inner.operations.borrow_mut() = operations;
    }

    /// Whether the blueprint behind this component registered `name`.
    pub fn has_operation(&self, name: &str) -> bool {
        self.inner.operations.borrow().get(name).is_some()
    }

    /// Dispatch a named operation registered on this node's blueprint.
    pub fn call(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let operation = self.inner.operations.borrow().get(name);
        let Some(operation) = operation else {
            return Err(Error::UnknownOperation {
                tag: self.tag().to_owned(),
                name: name.to_owned(),
            });
        };
        operation(&self.context(), value.into());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Builder
    // ------------------------------------------------------------------

    /// Seed a state key.
    pub fn with_state(self, key: &str, value: impl Into<Slot>) -> Self {
        self.state().set(key, value);
        self
    }

    /// Set an attribute. `false` and `Null` leave it out of the markup,
    /// `true` renders it bare.
    pub fn attr(self, key: &str, value: impl Into<Slot>) -> Self {
        self.attributes().set(key, value);
        self
    }

    /// Set an inline style property, named in camelCase or kebab-case.
    pub fn style(self, key: &str, value: impl Into<Slot>) -> Self {
        self.styles().set(key, value);
        self
    }

    /// Append a child. A child that would create a cycle is skipped and
    /// logged; use [`append`](Self::append) to get the error instead.
    pub fn child(self, child: impl Into<Child>) -> Self {
        if let Err(err) = self.append(child) {
            warn!(%err, tag = self.tag(), "child rejected");
        }
        self
    }

    /// Append several children.
    pub fn extend<I, C>(self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        children
            .into_iter()
            .fold(self, |node, child| node.child(child))
    }

    /// Append a static text child.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Child::Text(text.into()))
    }

    /// Register a handler for `kind`. See [`Component::add_handler`] for when
    /// handlers are bound to the host.
    pub fn on(self, kind: &str, handler: impl Fn(&Context, &Event) + 'static) -> Self {
        self.add_handler(kind, handler);
        self
    }

    /// Shorthand for `on("click", …)`.
    pub fn on_click(self, handler: impl Fn(&Context, &Event) + 'static) -> Self {
        self.on("click", handler)
    }

    /// Declare a side effect. Once mounted it re-runs whenever what it read
    /// changes, and can reach the host node through
    /// [`Context::element`].
    pub fn effect(self, f: impl Fn(&Context) + 'static) -> Self {
        self.add_side_effect(f);
        self
    }

    /// Set the `id` attribute.
    pub fn id(self, value: impl Into<Slot>) -> Self {
        self.attr("id", value)
    }

    /// Set the `class` attribute.
    pub fn class(self, value: impl Into<Slot>) -> Self {
        self.attr("class", value)
    }

    /// Set the `display` style.
    pub fn display(self, value: impl Into<Slot>) -> Self {
        self.style("display", value)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.inner.id.raw())
            .field("tag", &self.inner.tag)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_sets_parent_and_root() {
        let leaf = Component::new("span");
        let middle = Component::new("p").child(&leaf);
        let top = Component::new("div").child(&middle);

        assert_eq!(leaf.parent(), Some(middle.clone()));
        assert_eq!(leaf.root(), top);
        assert_eq!(top.root(), top);
        assert!(top.parent().is_none());
    }

    #[test]
    fn node_has_at_most_one_parent() {
        let leaf = Component::new("span");
        let first = Component::new("div").child(&leaf);
        let second = Component::new("div");

        second.append(&leaf).unwrap();

        assert_eq!(leaf.parent(), Some(second.clone()));
        assert!(first.children().is_empty());
        assert_eq!(second.children().len(), 1);
    }

    #[test]
    fn cycles_are_rejected() {
        let inner = Component::new("span");
        let outer = Component::new("div").child(&inner);

        assert!(matches!(inner.append(&outer), Err(Error::Cycle { .. })));
        assert!(matches!(outer.append(&outer), Err(Error::Cycle { .. })));
        assert!(inner.children().is_empty());
    }

    #[test]
    fn replace_children_reparents() {
        let a = Component::new("a");
        let b = Component::new("b");
        let list = Component::new("ul").child(&a);

        list.replace_children([b.clone()]).unwrap();

        assert!(a.parent().is_none());
        assert_eq!(b.parent(), Some(list.clone()));
        assert_eq!(list.nth(0), Some(b));
    }

    #[test]
    fn parent_is_not_kept_alive_by_children() {
        let leaf = Component::new("span");
        {
            let _parent = Component::new("div").child(&leaf);
            assert!(leaf.parent().is_some());
        }
        assert!(leaf.parent().is_none());
    }

    #[test]
    fn invoke_replaces_args() {
        let node = Component::new("input");
        node.invoke([true]);
        assert_eq!(node.args(), vec![Value::Bool(true)]);
        assert_eq!(node.context().arg(0), Value::Bool(true));
        assert_eq!(node.context().arg(3), Value::Null);

        node.invoke(Vec::<Value>::new());
        assert!(node.args().is_empty());
    }

    #[test]
    fn unknown_operation_is_an_error() {
        let node = Component::new("div");
        let err = node.call("toggle", true).unwrap_err();
        assert!(matches!(err, Error::UnknownOperation { .. }));
    }
}
