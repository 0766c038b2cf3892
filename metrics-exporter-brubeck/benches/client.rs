use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use metrics_exporter_brubeck::{BrubeckBuilder, Transport};

struct NullTransport;

impl Transport for NullTransport {
    fn send(&self, payload: &[u8]) -> std::io::Result<usize> {
        Ok(payload.len())
    }
}

fn client_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("client");

    let client = BrubeckBuilder::default().with_prefix("bench").with_transport(NullTransport).build();
    group.bench_function("increment", |b| b.iter(|| client.increment(black_box("requests"))));
    group.bench_function("record_time", |b| {
        b.iter(|| client.record_time(black_box("latency"), black_box(12.345)))
    });
    group.bench_function("increment_sampled", |b| {
        b.iter(|| client.increment_sampled(black_box("requests"), black_box(3), black_box(0.1)))
    });
    group.bench_function("rescale_count", |b| {
        b.iter(|| client.rescale_count(black_box(77), black_box(0.125)))
    });

    let disabled = BrubeckBuilder::default().with_disabled(true).build();
    group.bench_function("disabled overhead (increment_sampled)", |b| {
        b.iter(|| disabled.increment_sampled(black_box("requests"), black_box(3), black_box(0.1)))
    });

    group.finish();
}

criterion_group!(benches, client_benchmark);
criterion_main!(benches);
