mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pseudoparse::{lexer, parser, source};

fn bench_frontend(c: &mut Criterion) {
    for (label, path) in common::WORKLOADS {
        let raw = common::load_source(path);
        let (clean, _map) = source::normalize(&raw);
        let tokens = lexer::tokenize(&clean).expect("tokenize");

        c.bench_function(&format!("frontend_normalize_{label}"), |b| {
            b.iter(|| {
                let out = source::normalize(black_box(&raw));
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_tokenize_{label}"), |b| {
            b.iter(|| {
                let out = lexer::tokenize(black_box(&clean)).expect("tokenize");
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_parse_only_{label}"), |b| {
            b.iter(|| {
                let out = parser::parse_tokens(black_box(tokens.clone())).expect("parse");
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_pipeline_{label}"), |b| {
            b.iter(|| {
                let (clean, _map) = source::normalize(black_box(&raw));
                let tokens = lexer::tokenize(&clean).expect("tokenize");
                let out = parser::parse_tokens(tokens).expect("parse");
                black_box(out);
            })
        });
    }
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);
