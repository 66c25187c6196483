//! Criterion benchmarks for whole-buffer effect rendering
//!
//! Run with: cargo bench -p cadenza-effects
#![allow(missing_docs)]

use cadenza_effects::{EffectDefaults, EffectKind, apply_chain, parse_chain};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

const SAMPLE_RATE: f32 = 44100.0;
const BUFFER_SIZES: &[usize] = &[1024, 8192, 44100];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_kinds(c: &mut Criterion) {
    let defaults = EffectDefaults::default();
    for kind in EffectKind::ALL {
        let spec = defaults.spec(kind);
        let mut group = c.benchmark_group(kind.name());
        for &size in BUFFER_SIZES {
            let input = generate_test_signal(size);
            group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
                b.iter(|| black_box(spec.render(black_box(&input), SAMPLE_RATE)))
            });
        }
        group.finish();
    }
}

fn bench_chain(c: &mut Criterion) {
    let chain = match parse_chain(
        "filter:cutoff=2kHz|compression|delay:delay_time=120ms|reverb:room_size=0.3|normalize",
        &EffectDefaults::default(),
    ) {
        Ok(chain) => chain,
        Err(e) => panic!("bench chain: {e}"),
    };
    let input = generate_test_signal(44100);
    c.bench_function("chain_5_one_second", |b| {
        b.iter(|| black_box(apply_chain(&chain, black_box(&input), SAMPLE_RATE, 10)))
    });
}

criterion_group!(benches, bench_kinds, bench_chain);
criterion_main!(benches);
