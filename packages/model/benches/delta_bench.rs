use criterion::{black_box, criterion_group, criterion_main, Criterion};
use doctree_model::Delta;

fn long_document(runs: usize) -> Delta {
    let mut delta = Delta::new();
    let mut bold = doctree_model::Attributes::new();
    bold.insert("bold".to_string(), serde_json::json!(true));

    for i in 0..runs {
        let attrs = if i % 2 == 0 { None } else { Some(bold.clone()) };
        delta = delta.insert(format!("run {} of the document ", i), attrs);
    }
    delta
}

fn bench_compose(c: &mut Criterion) {
    let base = long_document(200);
    let len = base.text_len();
    let patch = Delta::new()
        .retain(len / 2, None)
        .insert("inserted in the middle", None)
        .retain(len / 4, None)
        .delete(10);

    c.bench_function("compose 200-run document", |b| {
        b.iter(|| black_box(&base).compose(black_box(&patch)).unwrap())
    });
}

fn bench_invert(c: &mut Criterion) {
    let base = long_document(200);
    let patch = Delta::new().retain(50, None).delete(100);

    c.bench_function("invert against 200-run base", |b| {
        b.iter(|| black_box(&patch).invert(black_box(&base)))
    });
}

fn bench_slice(c: &mut Criterion) {
    let base = long_document(200);
    let len = base.text_len();

    c.bench_function("slice middle half", |b| {
        b.iter(|| black_box(&base).slice(len / 4, 3 * len / 4))
    });
}

criterion_group!(benches, bench_compose, bench_invert, bench_slice);
criterion_main!(benches);
