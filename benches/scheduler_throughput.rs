//! Scheduler throughput benchmarks.
//!
//! Measures enqueue/dequeue cost at several queue depths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use trivia_core::scheduler::{PriorityQueue, PriorityScheduler, SchedulerConfig};

const TOPICS: &[&str] = &["science", "history", "geography", "music", "sports", "art"];

fn filled_scheduler(depth: usize) -> PriorityScheduler {
    let mut scheduler = PriorityScheduler::new(SchedulerConfig::default());
    for i in 0..depth {
        scheduler.enqueue(TOPICS[i % TOPICS.len()], "medium", (i % 7) as i64, None);
    }
    scheduler
}

fn bench_enqueue_dequeue(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_enqueue_dequeue");

    for depth in [0usize, 100, 10_000] {
        let mut scheduler = filled_scheduler(depth);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, _| {
            let mut n = 0i64;
            b.iter(|| {
                scheduler.enqueue(black_box("science"), "easy", n % 5, None);
                n += 1;
                black_box(scheduler.dequeue());
            })
        });
    }

    group.finish();
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_drain");

    for depth in [100usize, 1_000] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::new("items", depth), &depth, |b, &depth| {
            b.iter_batched(
                || filled_scheduler(depth),
                |mut scheduler| while scheduler.dequeue().is_some() {},
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_priority_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("priority_queue_push_pop");
    group.throughput(Throughput::Elements(1_000));
    group.bench_function("mixed_priorities", |b| {
        b.iter(|| {
            let mut queue = PriorityQueue::new();
            for i in 0..1_000u32 {
                queue.push(i, i64::from(i % 13));
            }
            while let Some(item) = queue.pop() {
                black_box(item);
            }
        })
    });
    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let scheduler = filled_scheduler(1_000);
    c.bench_function("scheduler_stats_1000", |b| b.iter(|| black_box(scheduler.get_stats())));
}

criterion_group!(
    benches,
    bench_enqueue_dequeue,
    bench_drain,
    bench_priority_queue,
    bench_stats,
);
criterion_main!(benches);
