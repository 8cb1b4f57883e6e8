/// Shared helpers: synthetic probe recordings and on-disk SpikeGLX fixtures.
use ndarray::{Array, Array2, Dimension};
use std::f64::consts::PI;
use std::io::Write;
use std::path::{Path, PathBuf};

#[allow(unused)]
/// Synthetic LF recording [T, C] in i16 counts.
///
/// Every channel carries a 12 Hz oscillation whose amplitude and phase
/// drift with depth, a large 0.2 Hz common-mode drift shared by all
/// channels, and a per-channel DC offset.
pub fn synthetic_raw(n_samples: usize, n_channels: usize, fs: f64) -> Array2<i16> {
    Array2::from_shape_fn((n_samples, n_channels), |(t, c)| {
        let time = t as f64 / fs;
        let depth = (c / 4) as f64;
        let osc = (200.0 + 25.0 * depth) * (2.0 * PI * 12.0 * time + 0.3 * depth).sin();
        let drift = 800.0 * (2.0 * PI * 0.2 * time).sin();
        let offset = 50.0 * (c % 7) as f64;
        (osc + drift + offset).round() as i16
    })
}

#[allow(unused)]
/// Write `samples` as `<dir>/<stem>.bin` plus a matching `.meta`; returns
/// the `.bin` path.
pub fn write_spikeglx(dir: &Path, stem: &str, samples: &Array2<i16>, fs: f64) -> PathBuf {
    let bin = dir.join(format!("{stem}.bin"));
    let mut f = std::fs::File::create(&bin).unwrap();
    for v in samples.iter() {
        f.write_all(&v.to_le_bytes()).unwrap();
    }
    let (_, n_chan) = samples.dim();
    let meta = format!(
        "imSampRate={fs}\nnSavedChans={n_chan}\nfileSizeBytes={}\ntypeThis=imec\n~snsShankMap=(4,2,{n_chan})\n",
        samples.len() * 2
    );
    std::fs::write(bin.with_extension("meta"), meta).unwrap();
    bin
}

#[allow(unused)]
/// Global mean and population standard deviation.
pub fn mean_std<D: Dimension>(a: &Array<f64, D>) -> (f64, f64) {
    let n = a.len() as f64;
    let mean = a.sum() / n;
    let var = a.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[allow(unused)]
/// Maximum absolute difference between two arrays.
pub fn max_abs_diff<D: Dimension>(a: &Array<f64, D>, b: &Array<f64, D>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).fold(0.0_f64, f64::max)
}
