//! Incremental Renderer
//!
//! [`Renderer::mount`] materializes a component tree into a host container
//! and leaves behind a web of effects, one per reactive concern:
//!
//! - one key-set effect per node for attributes, owning one effect per key
//! - the same pair for styles
//! - one effect per user side effect
//! - exactly one effect over the child list, owning one text effect per
//!   producer child
//! - for documents, one effect for the title
//!
//! Every write to the host goes through the node's [`HostRecord`] caches, so
//! an effect that re-runs without a visible change costs no host mutation.
//! When the child list changes, the previous host children are disposed and
//! detached before the new list is built.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::component::{Child, Component, Context, Producer, Value};
use crate::config::RenderConfig;
use crate::reactive::{untracked, Effect};

use super::record::HostRecord;
use super::{Event, Host};

/// Host text for an attribute value: `None` removes the attribute.
pub fn attribute_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some(String::new()),
        other => Some(other.to_string()),
    }
}

/// Host text for a style value: `None` removes the property.
pub fn style_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}

/// Keeps component trees mounted into host containers.
pub struct Renderer<H: Host> {
    builder: Builder<H>,
    mounts: RefCell<HashMap<H::Node, Rc<HostRecord<H>>>>,
}

impl<H: Host> Renderer<H> {
    /// Renderer with the default [`RenderConfig`].
    pub fn new(host: H) -> Self {
        Self::with_config(host, RenderConfig::default())
    }

    /// Renderer with explicit options.
    pub fn with_config(host: H, config: RenderConfig) -> Self {
        Self {
            builder: Builder {
                host: Rc::new(host),
                config: Rc::new(config),
            },
            mounts: RefCell::new(HashMap::new()),
        }
    }

    /// The host this renderer writes to.
    pub fn host(&self) -> &H {
        &self.builder.host
    }

    /// Options in effect.
    pub fn config(&self) -> &RenderConfig {
        &self.builder.config
    }

    /// Materialize `component` into `container`.
    ///
    /// Whatever this renderer previously mounted there is disposed and
    /// detached first. Returns the host node created for `component`, or
    /// `container` itself when `component` is a document.
    pub fn mount(&self, component: &Component, container: &H::Node) -> H::Node {
        let host = &*self.builder.host;

        self.unmount(container);
        if self.builder.config.clear_container {
            while let Some(child) = host.first_child(container) {
                host.remove_child(container, &child);
            }
        }

        let record: Rc<HostRecord<H>> = HostRecord::new(container.clone());
        let root = untracked(|| {
            if component.is_document() {
                self.builder.fill_document(component, &record);
                container.clone()
            } else {
                let child = self.builder.materialize(component);
                host.append_child(container, &child.node);
                let node = child.node.clone();
                record.push_child(child);
                node
            }
        });

        debug!(tag = component.tag(), "mounted");
        self.mounts.borrow_mut().insert(container.clone(), record);
        root
    }

    /// Dispose and detach whatever is mounted in `container`. Returns
    /// whether anything was.
    pub fn unmount(&self, container: &H::Node) -> bool {
        let previous = self.mounts.borrow_mut().remove(container);
        match previous {
            Some(record) => {
                debug!(children = record.child_count(), "disposing previous mount");
                record.dispose();
                record.detach_children(&self.builder.host);
                true
            }
            None => false,
        }
    }

    /// Whether a tree is currently mounted into `container`.
    pub fn is_mounted(&self, container: &H::Node) -> bool {
        self.mounts.borrow().contains_key(container)
    }
}

impl<H: Host> Drop for Renderer<H> {
    fn drop(&mut self) {
        for (_, record) in self.mounts.get_mut().drain() {
            record.dispose();
        }
    }
}

/// Shared by every effect the renderer installs.
struct Builder<H: Host> {
    host: Rc<H>,
    config: Rc<RenderConfig>,
}

impl<H: Host> Clone for Builder<H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            config: self.config.clone(),
        }
    }
}

impl<H: Host> Builder<H> {
    fn materialize(&self, component: &Component) -> Rc<HostRecord<H>> {
        let element = self.host.create_element(component.tag());
        let record: Rc<HostRecord<H>> = HostRecord::new(element.clone());
        let ctx = Context::with_element(component.clone(), element);

        trace!(tag = component.tag(), "materialize");
        self.bind_attributes(&ctx, &record);
        self.bind_styles(&ctx, &record);
        self.bind_events(component, &record);
        self.bind_side_effects(&ctx, &record);
        self.bind_children(&ctx, &record);
        record
    }

    fn fill_document(&self, document: &Component, record: &Rc<HostRecord<H>>) {
        let ctx = Context::with_element(document.clone(), record.node.clone());
        let kinds = document.events().kinds();
        if !kinds.is_empty() {
            warn!(?kinds, "event handlers on a document root are not bound");
        }
        if self.config.write_title {
            self.bind_title(&ctx, record);
        }
        self.bind_side_effects(&ctx, record);
        self.bind_children(&ctx, record);
    }

    fn bind_attributes(&self, ctx: &Context, record: &Rc<HostRecord<H>>) {
        let builder = self.clone();
        let weak = Rc::downgrade(record);
        let ctx = ctx.clone();

        record.keep(Effect::new(move || {
            let Some(record) = weak.upgrade() else { return };
            let keys = ctx.attributes().keys();

            for name in record.attr_effect_names() {
                if !keys.contains(&name) {
                    record.drop_attr_effect(&name);
                    record.apply_attribute(&builder.host, &name, None);
                }
            }
            for name in keys {
                if !record.has_attr_effect(&name) {
                    let effect = builder.attribute_effect(&ctx, &record, name.clone());
                    record.set_attr_effect(&name, effect);
                }
            }
        }));
    }

    fn attribute_effect(&self, ctx: &Context, record: &Rc<HostRecord<H>>, name: String) -> Effect {
        let host = self.host.clone();
        let weak = Rc::downgrade(record);
        let ctx = ctx.clone();

        Effect::new(move || {
            let Some(record) = weak.upgrade() else { return };
            let value = ctx.attributes().get(&name);
            record.apply_attribute(&host, &name, attribute_text(&value).as_deref());
        })
    }

    fn bind_styles(&self, ctx: &Context, record: &Rc<HostRecord<H>>) {
        let builder = self.clone();
        let weak = Rc::downgrade(record);
        let ctx = ctx.clone();

        record.keep(Effect::new(move || {
            let Some(record) = weak.upgrade() else { return };
            let keys = ctx.styles().keys();

            for key in record.style_effect_keys() {
                if !keys.contains(&key) {
                    record.drop_style_effect(&key);
                    let property = builder.config.style_property(&key);
                    record.apply_style(&builder.host, &property, None);
                }
            }
            for key in keys {
                if !record.has_style_effect(&key) {
                    let effect = builder.style_effect(&ctx, &record, key.clone());
                    record.set_style_effect(&key, effect);
                }
            }
        }));
    }

    fn style_effect(&self, ctx: &Context, record: &Rc<HostRecord<H>>, key: String) -> Effect {
        let host = self.host.clone();
        let weak = Rc::downgrade(record);
        let ctx = ctx.clone();
        let property = self.config.style_property(&key);

        Effect::new(move || {
            let Some(record) = weak.upgrade() else { return };
            let value = ctx.styles().get(&key);
            record.apply_style(&host, &property, style_text(&value).as_deref());
        })
    }

    fn bind_events(&self, component: &Component, record: &Rc<HostRecord<H>>) {
        for kind in component.events().kinds() {
            let node = component.clone();
            let weak: Weak<HostRecord<H>> = Rc::downgrade(record);
            let listener_kind = kind.clone();

            self.host.add_event_listener(
                &record.node,
                &kind,
                Rc::new(move |event: &Event| {
                    // Detached subtrees stay inert.
                    let Some(record) = weak.upgrade() else { return };
                    trace!(kind = %listener_kind, tag = node.tag(), "dispatch");
                    node.events().dispatch(&listener_kind, event, || {
                        Context::with_element(node.clone(), record.node.clone())
                    });
                }),
            );
        }
    }

    fn bind_side_effects(&self, ctx: &Context, record: &Rc<HostRecord<H>>) {
        for side_effect in ctx.node().side_effects() {
            let ctx = ctx.clone();
            record.keep(Effect::new(move || side_effect(&ctx)));
        }
    }

    fn bind_title(&self, ctx: &Context, record: &Rc<HostRecord<H>>) {
        let host = self.host.clone();
        let ctx = ctx.clone();
        let last: RefCell<Option<String>> = RefCell::new(None);

        record.keep(Effect::new(move || {
            let Some(head) = ctx.node().head() else { return };
            let Some(title) = head.title(&ctx) else { return };
            let title = title.to_string();
            if last.borrow().as_deref() != Some(title.as_str()) {
                trace!(%title, "set title");
                host.set_title(&title);
                *last.borrow_mut() = Some(title);
            }
        }));
    }

    fn bind_children(&self, ctx: &Context, record: &Rc<HostRecord<H>>) {
        let builder = self.clone();
        let weak = Rc::downgrade(record);
        let ctx = ctx.clone();

        record.keep(Effect::new(move || {
            let Some(record) = weak.upgrade() else { return };

            if record.child_count() > 0 {
                debug!(tag = ctx.node().tag(), "rebuilding children");
            }
            record.detach_children(&builder.host);

            let children = ctx.node().children();
            untracked(|| {
                for child in children {
                    let child_record = match child {
                        Child::Node(node) => builder.materialize(&node),
                        Child::Text(text) => HostRecord::new(builder.host.create_text(&text)),
                        Child::Producer(producer) => builder.text_producer(&ctx, producer),
                    };
                    builder.host.append_child(&record.node, &child_record.node);
                    record.push_child(child_record);
                }
            });
        }));
    }

    fn text_producer(&self, ctx: &Context, producer: Producer) -> Rc<HostRecord<H>> {
        let record: Rc<HostRecord<H>> =
            HostRecord::with_text(self.host.create_text(""), Some(String::new()));
        let host = self.host.clone();
        let weak = Rc::downgrade(&record);
        let ctx = ctx.clone();

        record.keep(Effect::new(move || {
            let Some(record) = weak.upgrade() else { return };
            let text = producer(&ctx).to_string();
            record.apply_text(&*host, &text);
        }));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_values() {
        assert_eq!(attribute_text(&Value::Null), None);
        assert_eq!(attribute_text(&Value::Bool(false)), None);
        assert_eq!(attribute_text(&Value::Bool(true)), Some(String::new()));
        assert_eq!(attribute_text(&Value::from(0)), Some("0".to_owned()));
        assert_eq!(attribute_text(&Value::from("")), Some(String::new()));
    }

    #[test]
    fn style_values() {
        assert_eq!(style_text(&Value::Null), None);
        assert_eq!(style_text(&Value::Bool(false)), None);
        assert_eq!(style_text(&Value::from("block")), Some("block".to_owned()));
        assert_eq!(style_text(&Value::from(1.5)), Some("1.5".to_owned()));
    }
}
