use criterion::{black_box, criterion_group, criterion_main, Criterion};
use swx_core::reference::score_reference;
use swx_core::tiled::score_tiled;
use swx_core::wavefront::score_wavefront;
use swx_core::{ScoringScheme, SequenceGenerator};

fn bench_pair(len: usize) -> (Vec<u8>, Vec<u8>) {
    SequenceGenerator::with_seed(42)
        .generate_pair(len)
        .expect("generate benchmark pair")
}

fn bench_reference(c: &mut Criterion) {
    let (seq1, seq2) = bench_pair(2000);
    let scoring = ScoringScheme::default();

    c.bench_function("reference_2k", |b| {
        b.iter(|| {
            let report = score_reference(black_box(&seq1), black_box(&seq2), &scoring);
            black_box(report)
        })
    });
}

fn bench_wavefront_threads(c: &mut Criterion) {
    let (seq1, seq2) = bench_pair(2000);
    let scoring = ScoringScheme::default();

    let mut group = c.benchmark_group("wavefront_2k_threads");
    for threads in [1usize, 2, 4, 8] {
        group.bench_with_input(format!("t_{}", threads), &threads, |b, &threads| {
            b.iter(|| {
                let report =
                    score_wavefront(black_box(&seq1), black_box(&seq2), &scoring, threads);
                black_box(report)
            })
        });
    }
    group.finish();
}

fn bench_tiled_tile_sizes(c: &mut Criterion) {
    let (seq1, seq2) = bench_pair(2000);
    let scoring = ScoringScheme::default();

    let mut group = c.benchmark_group("tiled_2k_tile_sizes");
    for tile_size in [64usize, 256, 512] {
        group.bench_with_input(format!("tile_{}", tile_size), &tile_size, |b, &tile_size| {
            b.iter(|| {
                let report =
                    score_tiled(black_box(&seq1), black_box(&seq2), &scoring, 4, tile_size);
                black_box(report)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_reference,
    bench_wavefront_threads,
    bench_tiled_tile_sizes
);
criterion_main!(benches);
