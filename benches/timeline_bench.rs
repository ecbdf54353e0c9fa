//! Benchmarks for the versioned interval timeline
//!
//! Run with: cargo bench

use atlas::{Interval, PartitionChunk, Segment, VersionedTimeline};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const DAY: i64 = 86_400_000;

fn chunk(interval: Interval, version: &str) -> PartitionChunk {
    PartitionChunk::new(Segment::new("events", interval, version))
}

/// One day-granularity segment per day, plus a second version over every
/// fourth day - the shape a steadily re-ingested dataset settles into
fn populated_timeline(days: i64) -> VersionedTimeline {
    let mut timeline = VersionedTimeline::new();
    for day in 0..days {
        let interval = Interval::new(day * DAY, (day + 1) * DAY);
        timeline.add(interval, "v1", chunk(interval, "v1"));
        if day % 4 == 0 {
            timeline.add(interval, "v2", chunk(interval, "v2"));
        }
    }
    timeline
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");

    for days in [100, 1000] {
        group.throughput(Throughput::Elements(days as u64));
        group.bench_function(format!("add_{}_days", days), |b| {
            b.iter(|| {
                let mut timeline = VersionedTimeline::new();
                for day in 0..days {
                    let interval = Interval::new(day * DAY, (day + 1) * DAY);
                    timeline.add(interval, "v1", black_box(chunk(interval, "v1")));
                }
                timeline
            })
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for days in [100, 1000] {
        let timeline = populated_timeline(days);

        group.bench_function(format!("lookup_week_of_{}_days", days), |b| {
            let query = Interval::new(0, 7 * DAY);
            b.iter(|| timeline.lookup(black_box(query)))
        });

        group.bench_function(format!("lookup_full_{}_days", days), |b| {
            let query = Interval::new(0, days * DAY);
            b.iter(|| timeline.lookup(black_box(query)))
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    // Re-version a single day and look it up, the rebalancing hot path
    group.bench_function("reversion_and_lookup", |b| {
        let mut timeline = populated_timeline(365);
        let interval = Interval::new(0, DAY);

        b.iter(|| {
            timeline.add(interval, "v3", chunk(interval, "v3"));
            let slices = timeline.lookup(black_box(interval));
            timeline.remove(interval, "v3", 0);
            slices
        })
    });

    group.finish();
}

criterion_group!(benches, bench_add, bench_lookup, bench_churn);
criterion_main!(benches);
