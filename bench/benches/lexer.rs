use criterion::{criterion_group, criterion_main, Criterion};
use djinni::{lexer, token::Token, util::BreakableIteratorExt};
use std::hint::black_box;

static INPUT: &str = include_str!("../../fixtures/all_datatypes.djinni");

fn lexer(input: &str) {
    let mut i = 0;
    for token in lexer::Lexer::new(input).up_to(Token::is_eof) {
        if token.kind.is_error() {
            continue;
        }
        if token.is_eof() {
            break;
        }
        i += 1;
    }
    black_box(i);
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("lexer", |b| {
        b.iter(|| {
            black_box(lexer(black_box(INPUT)));
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
