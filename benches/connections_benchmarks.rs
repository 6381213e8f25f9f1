//! Benchmarks for the connections graph hot paths.
//!
//! `compute_activity` runs once per temporal memory step and scales with the
//! out-degree of the active cells; segment and synapse churn runs during every
//! learning step.
//!
//! Run with: `cargo bench --bench connections_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use htm_connections::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Builds a layer shaped like a typical temporal memory: `num_cells` cells with
/// a few segments each, every segment sampling `synapses_per_segment` inputs.
fn build_layer(
    num_cells: CellIdx,
    segments_per_cell: usize,
    synapses_per_segment: usize,
    rng: &mut ChaCha20Rng,
) -> Connections {
    let mut connections = Connections::with_cells(num_cells);
    let inputs: Vec<CellIdx> = (0..num_cells).collect();

    for cell in 0..num_cells {
        for _ in 0..segments_per_cell {
            let segment = connections.create_segment(cell).unwrap();
            for &presynaptic_cell in inputs.choose_multiple(rng, synapses_per_segment) {
                connections.create_synapse(segment, presynaptic_cell, rng.gen_range(0.0..1.0));
            }
        }
    }

    connections
}

fn random_active_cells(num_cells: CellIdx, count: usize, rng: &mut ChaCha20Rng) -> Vec<CellIdx> {
    let cells: Vec<CellIdx> = (0..num_cells).collect();
    cells.choose_multiple(rng, count).copied().collect()
}

fn bench_compute_activity(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_activity");
    let mut rng = ChaCha20Rng::seed_from_u64(42);

    for &(num_cells, segments_per_cell, active) in &[(2048, 2, 40), (16384, 4, 320), (65536, 2, 1300)] {
        let connections = build_layer(num_cells, segments_per_cell, 20, &mut rng);
        let active_cells = random_active_cells(num_cells, active, &mut rng);

        group.throughput(Throughput::Elements(active as u64));
        group.bench_with_input(
            BenchmarkId::new(format!("cells_{num_cells}_segments_{segments_per_cell}"), active),
            &active_cells,
            |b, active_cells| {
                b.iter(|| black_box(connections.compute_activity(active_cells.iter().copied(), 0.5)));
            },
        );
    }

    group.finish();
}

fn bench_segment_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_churn");
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let mut connections = build_layer(4096, 2, 20, &mut rng);

    group.bench_function("destroy_and_regrow", |b| {
        b.iter(|| {
            let cell = rng.gen_range(0..4096);
            if let Ok(segment) = connections.get_segment(cell, 0) {
                connections.destroy_segment(segment);
            }
            let segment = connections.create_segment(cell).unwrap();
            for input in 0..20 {
                connections.create_synapse(segment, (cell + input * 97) % 4096, 0.21);
            }
            black_box(connections.segment_flat_list_length())
        });
    });

    group.finish();
}

fn bench_write_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_read");
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let connections = build_layer(8192, 2, 20, &mut rng);

    group.throughput(Throughput::Elements(connections.num_synapses() as u64));
    group.bench_function("write", |b| b.iter(|| black_box(connections.write())));

    let proto = connections.write();
    group.bench_function("read", |b| {
        b.iter(|| black_box(Connections::read(&proto).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_compute_activity, bench_segment_churn, bench_write_read);
criterion_main!(benches);
