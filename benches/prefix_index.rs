//! Prefix index benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use trivia_core::index::PrefixIndex;

fn topic_words(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("topic-{:x}-{}", i.wrapping_mul(2_654_435_761) % 1_000_003, i % 17))
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let words = topic_words(1_000);
    let mut group = c.benchmark_group("prefix_index_insert");
    group.throughput(Throughput::Elements(words.len() as u64));
    group.bench_function("1000_words", |b| {
        b.iter(|| {
            let mut index = PrefixIndex::new();
            for w in &words {
                index.reinforce(black_box(w), 1);
            }
            index
        })
    });
    group.finish();
}

fn bench_autocomplete(c: &mut Criterion) {
    let mut index = PrefixIndex::new();
    for (i, w) in topic_words(10_000).iter().enumerate() {
        index.insert_weighted(w, (i % 100) as u64);
    }

    let mut group = c.benchmark_group("prefix_index_autocomplete");
    for prefix in ["topic-", "topic-1", "topic-1a", "nomatch"] {
        group.bench_with_input(BenchmarkId::new("prefix", prefix), &prefix, |b, prefix| {
            b.iter(|| black_box(index.autocomplete(prefix, 10)))
        });
    }
    group.finish();
}

fn bench_long_word(c: &mut Criterion) {
    let word = "z".repeat(10_000);
    c.bench_function("prefix_index_long_word_roundtrip", |b| {
        b.iter(|| {
            let mut index = PrefixIndex::new();
            index.insert(&word);
            black_box(index.delete(&word));
        })
    });
}

criterion_group!(benches, bench_insert, bench_autocomplete, bench_long_word);
criterion_main!(benches);
