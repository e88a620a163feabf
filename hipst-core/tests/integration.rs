//! Integration Tests for the Reactive Renderer
//!
//! These tests mount component trees into the in-memory host and verify that
//! store writes reach the host tree incrementally, and only when needed.

use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use hipst_core::component::{dynamic, Blueprint, Component, Document, Value};
use hipst_core::reactive::{effect, stop, untracked, Effect, ReactiveContext};
use hipst_core::render::{DomNode, Event, Host, MemoryDom, Renderer};

fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

/// Test that an effect re-runs once per write, in subscription order.
#[test]
fn effects_rerun_in_subscription_order() {
    let node = Component::new("div").with_state("n", 0);
    let log = Rc::new(RefCell::new(Vec::new()));

    let effects: Vec<Effect> = ["first", "second"]
        .into_iter()
        .map(|name| {
            let log = log.clone();
            let state = node.state();
            Effect::new(move || {
                let _ = state.get("n");
                log.borrow_mut().push(name);
            })
        })
        .collect();

    log.borrow_mut().clear();
    node.state().set("n", 1);
    node.state().set("n", 2);

    assert_eq!(*log.borrow(), vec!["first", "second", "first", "second"]);
    assert_eq!(effects[0].run_count(), 3);
}

/// Test that a re-run whose value did not change leaves the host untouched.
#[test]
fn unchanged_value_does_not_mutate_host() {
    let evaluations = counter();
    let evaluations_clone = evaluations.clone();
    let node = Component::new("div")
        .with_state("label", "same")
        .attr(
            "title",
            dynamic(move |ctx| {
                evaluations_clone.set(evaluations_clone.get() + 1);
                ctx.state().get("label")
            }),
        )
        .style("color", "red");

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&node, &body);
    assert_eq!(element.attribute("title").as_deref(), Some("same"));

    let before = renderer.host().mutations();
    node.state().set("label", "same");
    node.attributes().set("id", Value::Null);
    node.styles().set("color", "red");

    assert_eq!(evaluations.get(), 2);
    assert_eq!(renderer.host().mutations(), before);
}

/// Test that dependencies read only in a branch no longer taken are dropped.
#[test]
fn stale_branch_dependencies_are_pruned() {
    let node = Component::new("div")
        .with_state("useA", true)
        .with_state("a", "A")
        .with_state("b", "B");
    let runs = counter();
    let runs_clone = runs.clone();
    let state = node.state();

    let _effect = Effect::new(move || {
        runs_clone.set(runs_clone.get() + 1);
        if state.get("useA").is_truthy() {
            let _ = state.get("a");
        } else {
            let _ = state.get("b");
        }
    });

    node.state().set("useA", false);
    assert_eq!(runs.get(), 2);

    node.state().set("a", "A2");
    assert_eq!(runs.get(), 2);

    node.state().set("b", "B2");
    assert_eq!(runs.get(), 3);
}

/// Test that a stopped effect never runs again.
#[test]
fn stopped_effect_is_inert() {
    let node = Component::new("div").with_state("n", 0);
    let runs = counter();
    let runs_clone = runs.clone();
    let state = node.state();

    let effect = Effect::new(move || {
        let _ = state.get("n");
        runs_clone.set(runs_clone.get() + 1);
    });

    stop(&effect);
    node.state().set("n", 1);
    assert_eq!(runs.get(), 1);
    assert_eq!(effect.dependency_count(), 0);
}

/// Test that remounting disposes every effect of the previous mount.
#[test]
fn remount_disposes_previous_effects() {
    let runs = counter();
    let runs_clone = runs.clone();
    let node = Component::new("p")
        .with_state("n", 0)
        .effect(move |ctx| {
            let _ = ctx.state().get("n");
            runs_clone.set(runs_clone.get() + 1);
        })
        .child(dynamic(|ctx| ctx.state().get("n")));

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let first = renderer.mount(&node, &body);
    let second = renderer.mount(&node, &body);
    assert_eq!(runs.get(), 2);

    node.state().set("n", 7);
    assert_eq!(runs.get(), 3);

    assert!(first.parent().is_none());
    assert_eq!(first.text_content(), "0");
    assert_eq!(second.text_content(), "7");
    assert_eq!(body.children(), vec![second]);
}

/// Test attribute semantics for null, false, true and other values.
#[test]
fn attribute_value_semantics() {
    let node = Component::new("input")
        .attr("value", 0)
        .attr("checked", true)
        .attr("disabled", false)
        .attr("name", Value::Null);

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&node, &body);

    assert_eq!(element.attribute("value").as_deref(), Some("0"));
    assert_eq!(element.attribute("checked").as_deref(), Some(""));
    assert!(!element.has_attribute("disabled"));
    assert!(!element.has_attribute("name"));

    node.attributes().set("checked", false);
    node.attributes().set("disabled", true);
    node.attributes().set("name", "agree");
    assert!(!element.has_attribute("checked"));
    assert!(element.has_attribute("disabled"));
    assert_eq!(element.attribute("name").as_deref(), Some("agree"));

    node.attributes().remove("value");
    assert!(!element.has_attribute("value"));
    assert_eq!(element.attribute_names(), vec!["disabled", "name"]);
}

/// Test that a text producer updates its own text node in place.
#[test]
fn text_producer_updates_in_place() {
    let sibling = Component::new("span").text("static");
    let node = Component::new("p")
        .with_state("count", 1)
        .child(dynamic(|ctx| ctx.state().get("count")))
        .child(&sibling);

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&node, &body);

    let text = element.children()[0].clone();
    let span = element.children()[1].clone();
    assert_eq!(text.data(), "1");

    node.state().set("count", 2);

    assert_eq!(element.children()[0], text);
    assert_eq!(element.children()[1], span);
    assert_eq!(text.data(), "2");
}

/// Test that a style producer touches only its own property.
#[test]
fn style_producer_changes_one_property() {
    let node = Component::new("div")
        .with_state("on", false)
        .style("color", "blue")
        .display(dynamic(|ctx| {
            if ctx.state().get("on").is_truthy() {
                "block"
            } else {
                "none"
            }
        }));

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&node, &body);
    assert_eq!(element.style("display").as_deref(), Some("none"));

    let before = renderer.host().mutations();
    node.state().set("on", true);

    assert_eq!(element.style("display").as_deref(), Some("block"));
    assert_eq!(element.style("color").as_deref(), Some("blue"));
    assert_eq!(renderer.host().mutations(), before + 1);
}

/// Test that style keys are written as kebab-case properties and removed
/// when deleted from the store.
#[test]
fn style_keys_follow_the_store() {
    let node = Component::new("div").style("backgroundColor", "red");
    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&node, &body);

    assert_eq!(element.style("background-color").as_deref(), Some("red"));

    node.styles().set("fontSize", "2em");
    assert_eq!(element.style("font-size").as_deref(), Some("2em"));

    node.styles().remove("backgroundColor");
    assert!(element.style("background-color").is_none());
}

/// Test that replacing the child list disposes the old subtree first.
#[test]
fn replacing_children_rebuilds_the_list() {
    let evaluations = counter();
    let evaluations_clone = evaluations.clone();
    let old = Component::new("li").with_state("x", 0).child(dynamic(move |ctx| {
        evaluations_clone.set(evaluations_clone.get() + 1);
        ctx.state().get("x")
    }));
    let list = Component::new("ul").child(&old);

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&list, &body);
    let old_host = element.children()[0].clone();
    assert_eq!(evaluations.get(), 1);

    list.replace_children([Component::new("li").text("b"), Component::new("li").text("c")])
        .unwrap();

    assert_eq!(element.text_content(), "bc");
    assert!(old_host.parent().is_none());

    old.state().set("x", 1);
    assert_eq!(evaluations.get(), 1);
}

/// Test that appending a child materializes it.
#[test]
fn appending_a_child_renders_it() {
    let list = Component::new("ul").child(Component::new("li").text("a"));
    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&list, &body);

    list.append(Component::new("li").text("b")).unwrap();
    assert_eq!(element.to_html(), "<ul><li>a</li><li>b</li></ul>");

    list.clear_children();
    assert!(element.children().is_empty());
}

/// Test that every handler of a kind runs once with a fresh context.
#[test]
fn event_handlers_see_current_state() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let first = seen.clone();
    let second = seen.clone();

    let button = Component::new("button")
        .with_state("clicks", 0)
        .on_click(move |ctx, _| {
            let clicks = ctx.state().get("clicks").as_i64().unwrap_or(0);
            first.borrow_mut().push(clicks);
            ctx.state().set("clicks", clicks + 1);
        })
        .on_click(move |ctx, event| {
            assert_eq!(event.kind(), "click");
            second
                .borrow_mut()
                .push(ctx.state().get("clicks").as_i64().unwrap_or(0));
        })
        .child(dynamic(|ctx| ctx.state().get("clicks")));

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&button, &body);

    element.dispatch(&Event::new("click"));

    assert_eq!(*seen.borrow(), vec![0, 1]);
    assert_eq!(element.text_content(), "1");
}

/// Test that a panicking handler aborts the dispatch but leaves the engine
/// usable.
#[test]
fn panicking_handler_is_fail_fast() {
    let later = counter();
    let later_clone = later.clone();
    let node = Component::new("button")
        .with_state("n", 0)
        .on_click(|_, _| panic!("handler failed"))
        .on_click(move |_, _| later_clone.set(later_clone.get() + 1))
        .child(dynamic(|ctx| ctx.state().get("n")));

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&node, &body);

    let result = catch_unwind(AssertUnwindSafe(|| element.dispatch(&Event::new("click"))));
    assert!(result.is_err());
    assert_eq!(later.get(), 0);
    assert_eq!(ReactiveContext::depth(), 0);

    node.state().set("n", 5);
    assert_eq!(element.text_content(), "5");
}

/// Test that side effects run with the host node and track what they read.
#[test]
fn side_effects_reach_the_host_node() {
    let focused = Rc::new(RefCell::new(Vec::new()));
    let focused_clone = focused.clone();
    let node = Component::new("input")
        .with_state("focus", false)
        .effect(move |ctx| {
            if ctx.state().get("focus").is_truthy() {
                let tag = ctx.element::<DomNode>().and_then(DomNode::tag);
                focused_clone.borrow_mut().push(tag);
            }
        });

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    renderer.mount(&node, &body);
    assert!(focused.borrow().is_empty());

    node.state().set("focus", true);
    assert_eq!(*focused.borrow(), vec![Some("input".to_owned())]);
}

/// Test that a document drives the host title and mounts its children into
/// the container.
#[test]
fn document_title_follows_state() {
    let doc = Document::new()
        .with_state("page", "Home")
        .title(dynamic(|ctx| format!("Site - {}", ctx.state().get("page"))))
        .child(Component::new("main").text("content"));

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let root = renderer.mount(&doc, &body);

    assert_eq!(root, body);
    assert_eq!(renderer.host().title(), "Site - Home");
    assert_eq!(body.to_html(), "<body><main>content</main></body>");

    let before = renderer.host().mutations();
    doc.state().set("page", "Home");
    assert_eq!(renderer.host().mutations(), before);

    doc.state().set("page", "About");
    assert_eq!(renderer.host().title(), "Site - About");
}

/// Test that server-rendered markup is replaced on mount.
#[test]
fn mount_clears_foreign_children() {
    let dom = MemoryDom::new();
    let body = DomNode::element("body");
    dom.append_child(&body, &dom.create_text("server markup"));

    let renderer = Renderer::new(dom);
    renderer.mount(&Component::new("main"), &body);

    assert_eq!(body.to_html(), "<body><main></main></body>");
    assert!(renderer.is_mounted(&body));
    assert!(renderer.unmount(&body));
    assert!(body.children().is_empty());
}

/// Test that invoking a blueprint instance re-renders what read its
/// arguments.
#[test]
fn blueprint_arguments_are_reactive() {
    let checkbox = Blueprint::new("input")
        .define(|ctx| {
            ctx.attributes().set("type", "checkbox");
            ctx.attributes().set(
                "data-checked",
                dynamic(|ctx| if ctx.arg(0).is_truthy() { "1" } else { "0" }),
            );
        })
        .operation("check", |ctx, value| ctx.node().invoke([value]))
        .unwrap();

    let instance = checkbox.instantiate([true]);
    let form = Component::new("form").child(&instance);

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&form, &body);
    let input = element.find("input").unwrap();
    assert_eq!(input.attribute("data-checked").as_deref(), Some("1"));

    instance.invoke([false]);
    assert_eq!(input.attribute("data-checked").as_deref(), Some("0"));

    instance.call("check", true).unwrap();
    assert_eq!(input.attribute("data-checked").as_deref(), Some("1"));
}

/// Test that producers may read the root component's state.
#[test]
fn producers_can_read_root_state() {
    let leaf = Component::new("span").child(dynamic(|ctx| ctx.root().state().get("user")));
    let app = Component::new("div")
        .with_state("user", "ada")
        .child(Component::new("header").child(&leaf));

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&app, &body);
    assert_eq!(element.text_content(), "ada");

    app.state().set("user", "grace");
    assert_eq!(element.text_content(), "grace");
}

/// Test that an effect writing a key it reads runs again until the value
/// settles.
#[test]
fn self_writing_effect_settles_on_latest_value() {
    let node = Component::new("div").with_state("n", 0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = seen.clone();
    let state = node.state();

    let counter_effect = Effect::new(move || {
        let n = state.get("n").as_i64().unwrap_or(0);
        seen_clone.borrow_mut().push(n);
        if n < 3 {
            state.set("n", n + 1);
        }
    });

    assert_eq!(node.state().get("n").as_i64(), Some(3));
    assert_eq!(seen.borrow().last().copied(), Some(3));
    assert_eq!(counter_effect.run_count(), 4);
}

/// Test that a child appended to its parent while the parent's children are
/// being built still reaches the host.
#[test]
fn append_during_mount_reaches_the_host() {
    let list = Component::new("ul").child(Component::new("li").text("a").effect(|ctx| {
        let Some(parent) = ctx.parent() else { return };
        if untracked(|| parent.child_list().len()) < 2 {
            parent.append(Component::new("li").text("b")).unwrap();
        }
    }));

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    let element = renderer.mount(&list, &body);

    assert_eq!(list.children().len(), 2);
    assert_eq!(element.to_html(), "<ul><li>a</li><li>b</li></ul>");
}

/// Test that an effect lives exactly as long as its handle or a clone of it.
#[test]
fn effect_lives_as_long_as_its_handle() {
    let node = Component::new("div").with_state("n", 0);
    let runs = counter();

    let state = node.state();
    let runs_clone = runs.clone();
    let handle = effect(move || {
        let _ = state.get("n");
        runs_clone.set(runs_clone.get() + 1);
    });
    assert_eq!(runs.get(), 1);

    drop(handle);
    node.state().set("n", 1);
    assert_eq!(runs.get(), 1);
}

/// Test that event kinds are bound at mount: new handlers for a bound kind
/// run, while kinds first seen after mount and document handlers stay unbound.
#[test]
fn event_kinds_are_bound_at_mount() {
    let clicks = counter();
    let inputs = counter();
    let document_clicks = counter();

    let first = clicks.clone();
    let button = Component::new("button").on_click(move |_, _| first.set(first.get() + 1));
    let doc = Document::new().child(&button);
    let on_document = document_clicks.clone();
    doc.add_handler("click", move |_, _| on_document.set(on_document.get() + 1));

    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    renderer.mount(&doc, &body);
    let element = body.children().remove(0);

    let second = clicks.clone();
    button.add_handler("click", move |_, _| second.set(second.get() + 1));
    let on_input = inputs.clone();
    button.add_handler("input", move |_, _| on_input.set(on_input.get() + 1));

    element.dispatch(&Event::new("click"));
    element.dispatch(&Event::new("input"));
    body.dispatch(&Event::new("click"));

    assert_eq!(clicks.get(), 2);
    assert_eq!(inputs.get(), 0);
    assert_eq!(document_clicks.get(), 0);
}
