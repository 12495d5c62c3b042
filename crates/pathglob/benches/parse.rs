use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use pathglob::{make_re, parse, MatchOptions};

/// A spread of pattern shapes: plain stars, globstars, braces, ranges,
/// extglobs and bracket classes.
const PATTERNS: &[&str] = &[
    "*.js",
    "src/**/*.rs",
    "a/{b,c,d}/**/e.txt",
    "{1..100}",
    "**/!(*.d).ts",
    "[a-f0-9][a-f0-9]/??.md",
];

fn glob_benchmarks(c: &mut Criterion) {
    let options = MatchOptions::new();

    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(PATTERNS.len() as u64));
    group.bench_function("to-source", |b| {
        b.iter(|| {
            for pattern in PATTERNS {
                let _ = black_box(parse(black_box(pattern), &options));
            }
        });
    });
    group.bench_function("to-regex", |b| {
        b.iter(|| {
            for pattern in PATTERNS {
                let _ = black_box(make_re(black_box(pattern), &options));
            }
        });
    });
    group.finish();

    let glob = make_re("a/**/z/*.txt", &options).unwrap();
    let mut group = c.benchmark_group("match");
    group.bench_function("globstar-hit", |b| {
        b.iter(|| glob.is_match(black_box("a/b/c/d/z/notes.txt")));
    });
    group.bench_function("globstar-miss", |b| {
        b.iter(|| glob.is_match(black_box("a/b/c/d/e/notes.txt")));
    });
    group.finish();
}

criterion_group!(benches, glob_benchmarks);
criterion_main!(benches);
