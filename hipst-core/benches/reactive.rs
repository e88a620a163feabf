use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use hipst_core::component::{dynamic, Component};
use hipst_core::reactive::Effect;
use hipst_core::render::{DomNode, MemoryDom, Renderer};

fn trigger_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("trigger_fan_out");
    for subscribers in [1usize, 16, 256] {
        let node = Component::new("div").with_state("n", 0);
        let _effects: Vec<Effect> = (0..subscribers)
            .map(|_| {
                let state = node.state();
                Effect::new(move || {
                    black_box(state.get("n"));
                })
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(subscribers), &subscribers, |b, _| {
            let mut n = 0i64;
            b.iter(|| {
                n += 1;
                node.state().set("n", n);
            })
        });
    }
    group.finish();
}

fn list(rows: usize) -> Component {
    Component::new("ul").with_state("selected", 0).extend((0..rows).map(|i| {
        Component::new("li")
            .class(dynamic(move |ctx| {
                let selected = ctx.parent().map(|p| p.state().get("selected"));
                if selected.and_then(|v| v.as_i64()) == Some(i as i64) {
                    "selected"
                } else {
                    ""
                }
            }))
            .text(format!("row {i}"))
    }))
}

fn mount(c: &mut Criterion) {
    let mut group = c.benchmark_group("mount");
    for rows in [10usize, 100, 1000] {
        let tree = list(rows);
        let renderer = Renderer::new(MemoryDom::new());
        let body = DomNode::element("body");

        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| renderer.mount(&tree, &body))
        });
    }
    group.finish();
}

fn update_mounted(c: &mut Criterion) {
    let tree = list(1000);
    let renderer = Renderer::new(MemoryDom::new());
    let body = DomNode::element("body");
    renderer.mount(&tree, &body);

    c.bench_function("select_row_of_1000", |b| {
        let mut selected = 0i64;
        b.iter(|| {
            selected = (selected + 1) % 1000;
            tree.state().set("selected", selected);
        })
    });
}

criterion_group!(benches, trigger_fan_out, mount, update_mounted);
criterion_main!(benches);
