//! Single-band continuous wavelet transform.
//!
//! `wavelet_transform` turns a centre frequency in Hz into a wavelet scale
//! (`scale = f_c / (cycle_hz / sample_rate)`, with `f_c` the template's
//! centre frequency) and returns the coefficients at that one scale, with
//! the signal's shape.
//!
//! The transform follows PyWavelets' `cwt(method='conv')`: the wavelet is
//! integrated once (cumulative sum at `2^10` points), resampled at the
//! requested scale, convolved with the signal, then differentiated and
//! scaled by `-√scale`.  Convolution runs through RustFFT.
pub mod template;

use ndarray::{Array, ArrayBase, Axis, Data, Dimension, Zip};
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

use crate::config::WaveletConfig;
use crate::error::{check_axis, Error, Result};

pub use template::WaveletTemplate;

/// Continuous wavelet transform backend.
pub trait ContinuousWavelet {
    /// Scale at which `template` is centred on `cycles_per_sample`.
    fn frequency_to_scale(&self, template: &WaveletTemplate, cycles_per_sample: f64) -> Result<f64>;

    /// Coefficients of `signal` at a single `scale` along `axis`, same shape
    /// as `signal`.  Real templates yield zero imaginary parts.
    fn transform<S, D>(
        &self,
        signal: &ArrayBase<S, D>,
        template: &WaveletTemplate,
        scale: f64,
        axis: Axis,
    ) -> Result<Array<Complex64, D>>
    where
        S: Data<Elem = f64>,
        D: Dimension;
}

/// Integrated-wavelet convolution CWT.
#[derive(Debug, Clone, Copy)]
pub struct ConvolutionCwt {
    /// ψ is sampled at `2^precision` points before integration.
    pub precision: u32,
    /// Sampling precision for the centre-frequency estimate.
    pub frequency_precision: u32,
}

impl Default for ConvolutionCwt {
    fn default() -> Self {
        Self { precision: 10, frequency_precision: 8 }
    }
}

impl ConvolutionCwt {
    /// Reversed, scale-resampled integral of ψ (conjugated for complex
    /// templates), ready to convolve with.
    fn scaled_kernel(&self, template: &WaveletTemplate, scale: f64) -> Vec<Complex64> {
        let (psi, x) = template.wavefun(self.precision);
        let step = x[1] - x[0];
        let mut acc = Complex64::new(0.0, 0.0);
        let int_psi: Vec<Complex64> = psi
            .iter()
            .map(|&p| {
                acc += p;
                let v = acc * step;
                if template.is_complex() { v.conj() } else { v }
            })
            .collect();

        let n_taps = (scale * (x[x.len() - 1] - x[0]) + 1.0).ceil() as usize;
        let mut kernel: Vec<Complex64> = (0..n_taps)
            .map(|k| (k as f64 / (scale * step)) as usize)
            .take_while(|&j| j < int_psi.len())
            .map(|j| int_psi[j])
            .collect();
        kernel.reverse();
        kernel
    }
}

impl ContinuousWavelet for ConvolutionCwt {
    fn frequency_to_scale(&self, template: &WaveletTemplate, cycles_per_sample: f64) -> Result<f64> {
        if !(cycles_per_sample > 0.0 && cycles_per_sample.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "cycles_per_sample",
                value: cycles_per_sample,
                reason: "must be positive and finite",
            });
        }
        Ok(template.central_frequency(self.frequency_precision) / cycles_per_sample)
    }

    fn transform<S, D>(
        &self,
        signal: &ArrayBase<S, D>,
        template: &WaveletTemplate,
        scale: f64,
        axis: Axis,
    ) -> Result<Array<Complex64, D>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        check_axis(axis, signal.ndim())?;
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "scale",
                value: scale,
                reason: "must be positive and finite",
            });
        }
        let kernel = self.scaled_kernel(template, scale);
        let m = kernel.len();
        if m < 2 {
            return Err(Error::InvalidParameter { name: "scale", value: scale, reason: "too small" });
        }

        let mut out = Array::<Complex64, D>::zeros(signal.raw_dim());
        let n = signal.len_of(axis);
        if n == 0 {
            return Ok(out);
        }

        let n_fft = (n + m - 1).next_power_of_two();
        let mut planner = FftPlanner::<f64>::new();
        let fwd = planner.plan_fft_forward(n_fft);
        let inv = planner.plan_fft_inverse(n_fft);

        let mut k_fft: Vec<Complex64> = kernel
            .iter()
            .copied()
            .chain(std::iter::repeat(Complex64::default()))
            .take(n_fft)
            .collect();
        fwd.process(&mut k_fft);

        // Full convolution has n + m - 1 points, its difference n + m - 2;
        // keep the centred n.
        let offset = (m - 2) / 2;
        let gain = -scale.sqrt() / n_fft as f64;
        let complex = template.is_complex();
        let mut buf = vec![Complex64::default(); n_fft];

        Zip::from(signal.lanes(axis)).and(out.lanes_mut(axis)).for_each(|x, mut y| {
            buf.iter_mut().for_each(|b| *b = Complex64::default());
            for (b, &v) in buf.iter_mut().zip(x.iter()) {
                b.re = v;
            }
            fwd.process(&mut buf);
            for (b, &k) in buf.iter_mut().zip(&k_fft) {
                *b *= k;
            }
            inv.process(&mut buf);

            for (i, dst) in y.iter_mut().enumerate() {
                let c = (buf[offset + i + 1] - buf[offset + i]) * gain;
                *dst = if complex { c } else { Complex64::new(c.re, 0.0) };
            }
        });
        Ok(out)
    }
}

/// Converts a frequency in Hz into one wavelet band through a
/// [`ContinuousWavelet`] backend.
#[derive(Debug, Clone, Default)]
pub struct WaveletEngine<W = ConvolutionCwt> {
    backend: W,
}

impl<W: ContinuousWavelet> WaveletEngine<W> {
    pub fn new(backend: W) -> Self {
        Self { backend }
    }

    /// Coefficients of `signal` at `cycle_hz` along `axis`.
    pub fn wavelet_transform<S, D>(
        &self,
        signal: &ArrayBase<S, D>,
        sample_rate: f64,
        cycle_hz: f64,
        template: &WaveletTemplate,
        axis: Axis,
    ) -> Result<Array<Complex64, D>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "sample_rate",
                value: sample_rate,
                reason: "must be positive and finite",
            });
        }
        let scale = self.backend.frequency_to_scale(template, cycle_hz / sample_rate)?;
        log::debug!("wavelet {template} at {cycle_hz} Hz / {sample_rate} Hz -> scale {scale:.3}");
        self.backend.transform(signal, template, scale, axis)
    }

    /// [`wavelet_transform`](Self::wavelet_transform) driven by a
    /// [`WaveletConfig`].
    pub fn transform_with<S, D>(
        &self,
        signal: &ArrayBase<S, D>,
        cfg: &WaveletConfig,
        axis: Axis,
    ) -> Result<Array<Complex64, D>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let template: WaveletTemplate = cfg.template.parse()?;
        self.wavelet_transform(signal, cfg.sample_rate, cfg.cycle_hz, &template, axis)
    }
}

/// Single-band wavelet coefficients of `signal` along `axis` with the
/// default backend.  `template` is a name such as `cmor1.5-1.0`.
pub fn wavelet_transform<S, D>(
    signal: &ArrayBase<S, D>,
    sample_rate: f64,
    cycle_hz: f64,
    template: &str,
    axis: Axis,
) -> Result<Array<Complex64, D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let template: WaveletTemplate = template.parse()?;
    WaveletEngine::<ConvolutionCwt>::default().wavelet_transform(signal, sample_rate, cycle_hz, &template, axis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use std::f64::consts::PI;

    fn sine(freq: f64, fs: f64, n: usize) -> Array1<f64> {
        Array1::from_shape_fn(n, |t| (2.0 * PI * freq * t as f64 / fs).sin())
    }

    fn interior_mean_abs(c: &Array1<Complex64>) -> f64 {
        let n = c.len();
        let mid = &c.as_slice().unwrap()[n / 4..3 * n / 4];
        mid.iter().map(|v| v.norm()).sum::<f64>() / mid.len() as f64
    }

    #[test]
    fn default_scale_for_theta() {
        let cwt = ConvolutionCwt::default();
        let w: WaveletTemplate = "cmor1.5-1.0".parse().unwrap();
        let scale = cwt.frequency_to_scale(&w, 7.0 / 2500.0).unwrap();
        approx::assert_relative_eq!(scale, 2500.0 / 7.0, max_relative = 1e-9);
    }

    #[test]
    fn kernel_length_follows_scale() {
        let cwt = ConvolutionCwt::default();
        let w: WaveletTemplate = "cmor1.5-1.0".parse().unwrap();
        // ceil(62.5 * 16 + 1) taps
        assert_eq!(cwt.scaled_kernel(&w, 62.5).len(), 1001);
    }

    #[test]
    fn output_shape_matches_input() {
        let x = Array2::from_shape_fn((600, 3), |(t, c)| ((t + c) as f64 * 0.1).sin());
        let y = wavelet_transform(&x, 2500.0, 40.0, "cmor1.5-1.0", Axis(0)).unwrap();
        assert_eq!(y.dim(), x.dim());
    }

    #[test]
    fn on_frequency_sine_dominates() {
        let fs = 2500.0;
        let on = wavelet_transform(&sine(40.0, fs, 5000), fs, 40.0, "cmor1.5-1.0", Axis(0)).unwrap();
        let on = interior_mean_abs(&on);
        for off_hz in [15.0, 20.0, 80.0, 120.0] {
            let off = wavelet_transform(&sine(off_hz, fs, 5000), fs, 40.0, "cmor1.5-1.0", Axis(0)).unwrap();
            let off = interior_mean_abs(&off);
            assert!(on > 5.0 * off, "40 Hz: {on:.4}, {off_hz} Hz: {off:.4}");
        }
    }

    #[test]
    fn complex_morlet_magnitude_is_flat_on_a_sine() {
        let fs = 2500.0;
        let c = wavelet_transform(&sine(40.0, fs, 5000), fs, 40.0, "cmor1.5-1.0", Axis(0)).unwrap();
        let mags: Vec<f64> = c.iter().skip(1500).take(2000).map(|v| v.norm()).collect();
        let max = mags.iter().cloned().fold(f64::MIN, f64::max);
        let min = mags.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max - min < 0.1 * max, "envelope ripple {min}..{max}");
    }

    #[test]
    fn real_morlet_has_no_imaginary_part() {
        let c = wavelet_transform(&sine(30.0, 2500.0, 2000), 2500.0, 30.0, "morl", Axis(0)).unwrap();
        assert!(c.iter().all(|v| v.im == 0.0));
        assert!(c.iter().any(|v| v.re.abs() > 0.1));
    }

    #[test]
    fn config_driven_transform_matches_explicit_call() {
        let x = sine(7.0, 2500.0, 3000);
        let cfg = WaveletConfig::default();
        let engine = WaveletEngine::<ConvolutionCwt>::default();
        let a = engine.transform_with(&x, &cfg, Axis(0)).unwrap();
        let b = wavelet_transform(&x, 2500.0, 7.0, "cmor1.5-1.0", Axis(0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_parameters() {
        let x = Array1::<f64>::zeros(100);
        assert!(matches!(
            wavelet_transform(&x, 2500.0, 7.0, "haar", Axis(0)),
            Err(Error::UnknownWavelet(_))
        ));
        assert!(wavelet_transform(&x, 2500.0, 0.0, "morl", Axis(0)).is_err());
        assert!(wavelet_transform(&x, 0.0, 7.0, "morl", Axis(0)).is_err());
        assert!(wavelet_transform(&x, 2500.0, 7.0, "morl", Axis(1)).is_err());
    }
}
