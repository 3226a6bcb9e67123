//! Benchmarks for the embed and reverse passes.
//!
//! Run with: cargo bench --bench roundtrip

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use resona_core::pattern::PatternGenerator;
use resona_core::seed::ResonanceSeed;
use resona_engine::{embed, AdaptiveCorrector, Reverser};

const CHUNK: usize = 4096;

fn bench_embed(c: &mut Criterion) {
    let mut g = PatternGenerator::new(ResonanceSeed::from_u64(1));
    let set = g.generate(0.5, 48_000, 0.1).unwrap();

    c.bench_function("embed_4096", |b| {
        let mut samples = vec![0i16; CHUNK];
        b.iter(|| {
            embed(black_box(&set), black_box(&mut samples), 0);
        });
    });
}

fn bench_reverse(c: &mut Criterion) {
    let mut g = PatternGenerator::new(ResonanceSeed::from_u64(1));
    let set = g.generate(0.5, 48_000, 0.1).unwrap();

    let mut corrector = AdaptiveCorrector::with_seed(7);
    for p in &set {
        for _ in 0..100 {
            corrector.update(p.key(), 0.0, 0.0);
        }
    }

    c.bench_function("reverse_4096", |b| {
        let mut reverser = Reverser::new();
        let mut samples = vec![0i16; CHUNK];
        b.iter(|| {
            reverser.reverse(black_box(&set), black_box(&mut samples), 0, &corrector);
        });
    });
}

fn bench_corrector_update(c: &mut Criterion) {
    let mut g = PatternGenerator::new(ResonanceSeed::from_u64(1));
    let set = g.generate(0.5, 48_000, 0.1).unwrap();
    let key = set.as_slice()[0].key();

    c.bench_function("corrector_update", |b| {
        let mut corrector = AdaptiveCorrector::with_seed(9);
        let mut i = 0.0f32;
        b.iter(|| {
            i += 1.0;
            black_box(corrector.update(key, i.sin() * 100.0, 0.0));
        });
    });
}

criterion_group!(benches, bench_embed, bench_reverse, bench_corrector_update);
criterion_main!(benches);
