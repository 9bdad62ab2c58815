use criterion::{criterion_group, criterion_main, Criterion};
use djinni::parse_file;
use std::hint::black_box;

static INPUT: &str = include_str!("../../fixtures/all_datatypes.djinni");

fn parser(input: &str) {
    let file = parse_file(input).unwrap();
    _ = black_box(file);
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("parser", |b| {
        b.iter(|| {
            black_box(parser(black_box(INPUT)));
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
