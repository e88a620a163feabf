//! Reusable component definitions.
//!
//! A [`Blueprint`] is a template: a tag, a list of define hooks run against
//! every fresh instance, and a table of named operations. Instances are
//! plain [`Component`]s; their call-time arguments are read with
//! [`Context::arg`] and replaced with [`Component::invoke`].

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Error, Result};

use super::{Component, Context, Value};

/// A named operation: receives the instance context and one argument.
pub type Operation = Rc<dyn Fn(&Context, Value)>;

/// A define hook run once per instance.
pub type Define = Rc<dyn Fn(&Context)>;

/// Names owned by the builtin builder surface.
pub const RESERVED_OPERATIONS: &[&str] = &[
    "attr",
    "style",
    "with_state",
    "child",
    "extend",
    "text",
    "on",
    "on_click",
    "effect",
    "id",
    "class",
    "display",
    "append",
    "invoke",
    "call",
];

#[derive(Clone, Default)]
pub(crate) struct Operations {
    table: IndexMap<String, Operation>,
}

impl Operations {
    pub(crate) fn get(&self, name: &str) -> Option<Operation> {
        self.table.get(name).cloned()
    }
}

/// A reusable component recipe: a tag, `define` hooks run on every
/// instance, and a table of named operations.
#[derive(Clone)]
pub struct Blueprint {
    tag: String,
    defines: Vec<Define>,
    operations: Rc<Operations>,
}

impl Blueprint {
    /// Blueprint for elements tagged `tag`, with no hooks or operations.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            defines: Vec::new(),
            operations: Rc::default(),
        }
    }

    /// Tag of every instance.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Add a hook run against each new instance, in declaration order.
    pub fn define(mut self, f: impl Fn(&Context) + 'static) -> Self {
        self.defines.push(Rc::new(f));
        self
    }

    /// Register a named operation callable with [`Component::call`].
    ///
    /// Fails with [`Error::DuplicateOperation`] when `name` is already
    /// registered or collides with a builtin builder method.
    pub fn operation(mut self, name: &str, handler: impl Fn(&Context, Value) + 'static) -> Result<Self> {
        if RESERVED_OPERATIONS.contains(&name) || self.operations.table.contains_key(name) {
            return Err(Error::DuplicateOperation(name.to_owned()));
        }
        Rc::make_mut(&mut self.operations)
            .table
            .insert(name.to_owned(), Rc::new(handler));
        Ok(self)
    }

    /// Registered operation names, in registration order.
    pub fn operation_names(&self) -> Vec<&str> {
        self.operations.table.keys().map(String::as_str).collect()
    }

    /// Create an instance called with `args`.
    pub fn instantiate<I, V>(&self, args: I) -> Component
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let node = Component::new(self.tag.clone());
        node.set_operations(self.operations.clone());
        node.invoke(args);

        let ctx = node.context();
        for define in &self.defines {
            define(&ctx);
        }
        debug!(tag = %self.tag, id = node.component_id().raw(), "instantiated");
        node
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("tag", &self.tag)
            .field("defines", &self.defines.len())
            .field("operations", &self.operation_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::dynamic;
    use crate::reactive::Effect;
    use std::cell::RefCell;

    fn checkbox() -> Blueprint {
        Blueprint::new("input").define(|ctx| {
            ctx.attributes().set("type", "checkbox");
            ctx.attributes().set(
                "data-checked",
                dynamic(|ctx| if ctx.arg(0).is_truthy() { "1" } else { "0" }),
            );
        })
    }

    #[test]
    fn define_runs_per_instance() {
        let blueprint = checkbox();
        let on = blueprint.instantiate([true]);
        let off = blueprint.instantiate([false]);

        assert_eq!(on.tag(), "input");
        assert_eq!(on.attributes().get("data-checked"), Value::from("1"));
        assert_eq!(off.attributes().get("data-checked"), Value::from("0"));
        assert_ne!(on, off);
    }

    #[test]
    fn invoke_reruns_argument_readers() {
        let instance = checkbox().instantiate([true]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let attributes = instance.attributes();

        let _effect = Effect::new(move || {
            seen_clone
                .borrow_mut()
                .push(attributes.get("data-checked").to_string());
        });

        instance.invoke([false]);
        assert_eq!(*seen.borrow(), vec!["1", "0"]);
    }

    #[test]
    fn operations_dispatch_by_name() {
        let blueprint = Blueprint::new("details")
            .operation("toggle", |ctx, value| ctx.state().set("open", value))
            .unwrap();
        let instance = blueprint.instantiate(Vec::<Value>::new());

        assert!(instance.has_operation("toggle"));
        instance.call("toggle", true).unwrap();
        assert_eq!(instance.state().get("open"), Value::Bool(true));
    }

    #[test]
    fn duplicate_and_reserved_names_are_rejected() {
        let blueprint = Blueprint::new("div").operation("open", |_, _| {}).unwrap();

        assert!(matches!(
            blueprint.clone().operation("open", |_, _| {}),
            Err(Error::DuplicateOperation(name)) if name == "open"
        ));
        assert!(matches!(
            blueprint.operation("attr", |_, _| {}),
            Err(Error::DuplicateOperation(_))
        ));
    }
}
