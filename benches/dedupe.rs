//! Benchmarks for sentence deduplication.
//!
//! Benchmark targets:
//! - Short paragraph: <10us
//! - 1,000 sentences with heavy repetition: <1ms
//! - Envelope unwrapping overhead: small relative to plain text

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

use duplitext::SentenceDeduplicator;
use duplitext::services::deduplication::split_sentences;

const SHORT_TEXT: &str = "The build started. The build started! Tests ran? Tests ran. Done.";

/// Generates text with `count` sentences drawn from `distinct` variants.
fn generate_text(count: usize, distinct: usize) -> String {
    (0..count)
        .map(|i| {
            let n = i % distinct.max(1);
            if i % 2 == 0 {
                format!("Sentence number {n} finished. ")
            } else {
                format!("SENTENCE NUMBER {n} FINISHED! ")
            }
        })
        .collect()
}

fn wrap(text: &str) -> String {
    serde_json::json!({ "Data": text }).to_string()
}

fn bench_short(c: &mut Criterion) {
    let deduplicator = SentenceDeduplicator::default();
    let wrapped = wrap(SHORT_TEXT);

    let mut group = c.benchmark_group("dedupe_short");
    group.bench_function("plain", |b| {
        b.iter(|| deduplicator.dedupe(black_box(SHORT_TEXT)));
    });
    group.bench_function("envelope", |b| {
        b.iter(|| deduplicator.dedupe(black_box(&wrapped)));
    });
    group.bench_function("split_only", |b| {
        b.iter(|| split_sentences(black_box(SHORT_TEXT)).count());
    });
    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let deduplicator = SentenceDeduplicator::default();

    let mut group = c.benchmark_group("dedupe_scaling");
    group.measurement_time(Duration::from_secs(5));

    for count in [10, 100, 1_000, 10_000] {
        // Mostly duplicates versus mostly unique.
        for (label, distinct) in [("repetitive", 10), ("unique", count)] {
            let text = generate_text(count, distinct);
            group.throughput(Throughput::Bytes(text.len() as u64));
            group.bench_with_input(BenchmarkId::new(label, count), &text, |b, text| {
                b.iter(|| deduplicator.process(black_box(text)));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_short, bench_scaling);
criterion_main!(benches);
