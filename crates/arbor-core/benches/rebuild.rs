use arbor_core::{attr, child, on, text, App, MemoryBackend};
use criterion::{criterion_group, criterion_main, Criterion};

fn full_rebuild(c: &mut Criterion) {
    c.bench_function("rebuild_60_row_tree", |bencher| {
        let app = App::new(MemoryBackend::new());
        let component = app.component(0u64, |cx, scope| {
            let bump = scope.state().clone();
            let refresh = cx.element(
                "button",
                [
                    on("click", move || bump.update(|round| *round += 1)),
                    text("refresh"),
                ],
            )?;
            let mut rows = vec![child(refresh)];
            for index in 0..60 {
                let line = cx.element(
                    "p",
                    [
                        attr("data-row", index.to_string()),
                        text(format!("row {index} of round {}", scope.state().get())),
                    ],
                )?;
                rows.push(child(line));
            }
            cx.element("div", rows)
        });
        app.mount(&component).expect("mount");

        bencher.iter(|| {
            let button = app
                .with_backend(|backend: &mut MemoryBackend| {
                    backend.find("button").expect("button")
                })
                .expect("backend");
            app.fire(button, "click").expect("click");
        });
    });
}

criterion_group!(benches, full_rebuild);
criterion_main!(benches);
