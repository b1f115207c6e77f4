use criterion::{Criterion, black_box, criterion_group, criterion_main};
use textspan::{Span, SpanBuilder, TextCache};

fn bench_split(c: &mut Criterion) {
    let line = Span::new("alpha,beta,gamma,delta,epsilon,".repeat(8));
    c.bench_function("split_keep_empty", |b| {
        b.iter(|| black_box(line.split(',', false)));
    });
    c.bench_function("split_remove_empty", |b| {
        b.iter(|| black_box(line.split(',', true)));
    });
}

fn bench_concat_adjacent(c: &mut Criterion) {
    let mut builder = SpanBuilder::default();
    let parts: Vec<Span> = (0..16).map(|_| builder.push_str("fragment")).collect();
    c.bench_function("concat_adjacent_16", |b| {
        b.iter(|| black_box(builder.concat(&parts)));
    });
}

fn bench_intern(c: &mut Criterion) {
    let mut cache = TextCache::new();
    cache.intern("repeated-token");
    cache.intern("repeated-token");
    c.bench_function("intern_promoted_hit", |b| {
        b.iter(|| black_box(cache.intern("repeated-token")));
    });
}

fn bench_content_hash(c: &mut Criterion) {
    let span = Span::new("a moderately sized token for hashing".repeat(4));
    c.bench_function("content_hash", |b| {
        b.iter(|| black_box(span.content_hash()));
    });
}

fn bench_parse(c: &mut Criterion) {
    let span = Span::new("18446744073709551615");
    c.bench_function("parse_u64_max", |b| {
        b.iter(|| black_box(span.try_parse_u64()));
    });
}

criterion_group!(
    benches,
    bench_split,
    bench_concat_adjacent,
    bench_intern,
    bench_content_hash,
    bench_parse
);
criterion_main!(benches);
