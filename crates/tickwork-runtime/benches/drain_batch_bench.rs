//! Benchmarks for queue insertion and batch draining.
//!
//! Run with: cargo bench -p tickwork-runtime --bench drain_batch_bench
//!
//! Covers three shapes:
//!
//! - `append/mixed_priority`: sorted insertion with binary search
//! - `drain_batch/<budget>`: draining a full queue at foreground and background budgets
//! - `scheduler/run`: end-to-end run on a `WebHost`, frames delivered in a loop

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::rc::Rc;

use tickwork_runtime::{Job, JobQueue, Scheduler, SchedulerConfig};
use tickwork_web::WebHost;

const JOBS: usize = 1_000;

fn weight_for(i: usize) -> f64 {
    [1.0, 0.5, 0.25, 0.1][i % 4]
}

fn filled_queue(n: usize) -> JobQueue {
    let mut queue = JobQueue::new();
    for i in 0..n {
        queue.append(
            Job::new(|_| Ok(()))
                .with_weight(weight_for(i))
                .with_priority((i % 7) as i64 - 3),
        );
    }
    queue
}

fn bench_append(c: &mut Criterion) {
    c.bench_function("append/mixed_priority", |b| {
        b.iter(|| black_box(filled_queue(JOBS)));
    });
}

fn bench_drain_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_batch");
    for budget in [1.0, 8.0, 50.0] {
        group.bench_with_input(BenchmarkId::from_parameter(budget), &budget, |b, &budget| {
            b.iter_batched(
                || filled_queue(JOBS),
                |mut queue| {
                    let mut batches = 0u32;
                    while !queue.is_empty() {
                        black_box(queue.drain_batch(budget));
                        batches += 1;
                    }
                    batches
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_scheduler_run(c: &mut Criterion) {
    c.bench_function("scheduler/run", |b| {
        b.iter(|| {
            let host = Rc::new(WebHost::new());
            let scheduler = Scheduler::with_config(
                host.clone(),
                SchedulerConfig::default().with_jobs_per_tick(8.0),
            );
            for i in 0..JOBS {
                scheduler.append(Job::new(|_| Ok(())).with_weight(weight_for(i)));
            }
            scheduler.start();
            black_box(host.run_until_idle(JOBS + 1))
        });
    });
}

criterion_group!(benches, bench_append, bench_drain_batch, bench_scheduler_run);
criterion_main!(benches);
