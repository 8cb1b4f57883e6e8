use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array2, Axis};
use npx_lfp::{combine_to_csd, demux_to_shank_lfp, wavelet_transform, PipelineConfig};

const FS: f64 = 2500.0;

/// 10 s of 32-channel LF data (8 sites per shank).
fn raw_lf() -> Array2<i16> {
    Array2::from_shape_fn((25_000, 32), |(t, c)| {
        let phase = 2.0 * std::f64::consts::PI * 8.0 * t as f64 / FS + c as f64 * 0.1;
        (300.0 * phase.sin() + (c * 11 % 17) as f64) as i16
    })
}

fn bench_demux(c: &mut Criterion) {
    let raw = raw_lf();
    let cfg = PipelineConfig::default();
    c.bench_function("demux_to_shank_lfp [25000×32 i16]", |b| {
        b.iter(|| {
            let lfp = demux_to_shank_lfp(black_box(&raw), &cfg).unwrap();
            black_box(lfp[[0, 0, 0]])
        })
    });
}

fn bench_combine(c: &mut Criterion) {
    let lfp = demux_to_shank_lfp(&raw_lf(), &PipelineConfig::default()).unwrap();
    c.bench_function("combine_to_csd [4×25000×8]", |b| {
        b.iter(|| {
            let csd = combine_to_csd(black_box(&lfp)).unwrap();
            black_box(csd[[0, 0]])
        })
    });
}

fn bench_wavelet(c: &mut Criterion) {
    let lfp = demux_to_shank_lfp(&raw_lf(), &PipelineConfig::default()).unwrap();
    let csd = combine_to_csd(&lfp).unwrap();
    c.bench_function("wavelet_transform 7 Hz [25000×16]", |b| {
        b.iter(|| {
            let w = wavelet_transform(black_box(&csd), FS, 7.0, "cmor1.5-1.0", Axis(0)).unwrap();
            black_box(w[[0, 0]])
        })
    });
}

criterion_group!(benches, bench_demux, bench_combine, bench_wavelet);
criterion_main!(benches);
