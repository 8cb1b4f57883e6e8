//! Continuous wavelet templates, named as in PyWavelets.
//!
//! | name          | ψ(x)                                         |
//! |---------------|----------------------------------------------|
//! | `cmorB-C`     | (πB)^-½ · exp(-x² / B) · exp(2πiCx)          |
//! | `morl`        | exp(-x² / 2) · cos(5x)                        |
//!
//! Both are sampled on `[-8, 8]`.
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaveletTemplate {
    /// Complex Morlet with bandwidth `B` and centre frequency `C`.
    ComplexMorlet { bandwidth: f64, center: f64 },
    /// Real Morlet.
    Morlet,
}

impl WaveletTemplate {
    /// Whether coefficients are genuinely complex.
    pub fn is_complex(&self) -> bool {
        matches!(self, WaveletTemplate::ComplexMorlet { .. })
    }

    /// Support `(lower, upper)` over which ψ is sampled.
    pub fn bounds(&self) -> (f64, f64) {
        (-8.0, 8.0)
    }

    /// ψ(x).
    pub fn psi(&self, x: f64) -> Complex64 {
        match *self {
            WaveletTemplate::ComplexMorlet { bandwidth, center } => {
                let env = (PI * bandwidth).powf(-0.5) * (-x * x / bandwidth).exp();
                Complex64::from_polar(env, 2.0 * PI * center * x)
            }
            WaveletTemplate::Morlet => Complex64::new((-x * x / 2.0).exp() * (5.0 * x).cos(), 0.0),
        }
    }

    /// ψ sampled at `2^precision` evenly spaced points across
    /// [`bounds`](Self::bounds), with the sample positions.
    pub fn wavefun(&self, precision: u32) -> (Vec<Complex64>, Vec<f64>) {
        let n = 1usize << precision;
        let (lo, hi) = self.bounds();
        let step = (hi - lo) / (n - 1) as f64;
        let x: Vec<f64> = (0..n).map(|i| lo + step * i as f64).collect();
        let psi = x.iter().map(|&xi| self.psi(xi)).collect();
        (psi, x)
    }

    /// Centre frequency in cycles per unit of `x`, estimated from the
    /// dominant FFT bin of ψ sampled at `2^precision` points (PyWavelets
    /// `central_frequency`).
    pub fn central_frequency(&self, precision: u32) -> f64 {
        let (mut psi, x) = self.wavefun(precision);
        let n = psi.len();
        let domain = x[n - 1] - x[0];

        FftPlanner::<f64>::new().plan_fft_forward(n).process(&mut psi);

        // argmax over bins 1.. ; +2 converts to the 1-based index PyWavelets uses.
        let mut index = psi[1..]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
            .map(|(i, _)| i + 2)
            .unwrap_or(2);
        if index > n / 2 {
            index = n - index + 2;
        }
        (index - 1) as f64 / domain
    }
}

impl FromStr for WaveletTemplate {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let unknown = || Error::UnknownWavelet(name.to_string());
        if name == "morl" {
            return Ok(WaveletTemplate::Morlet);
        }
        let params = name.strip_prefix("cmor").ok_or_else(unknown)?;
        let (b, c) = params.split_once('-').ok_or_else(unknown)?;
        let bandwidth: f64 = b.parse().map_err(|_| unknown())?;
        let center: f64 = c.parse().map_err(|_| unknown())?;
        if !(bandwidth > 0.0 && center > 0.0) {
            return Err(unknown());
        }
        Ok(WaveletTemplate::ComplexMorlet { bandwidth, center })
    }
}

impl fmt::Display for WaveletTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveletTemplate::ComplexMorlet { bandwidth, center } => write!(f, "cmor{bandwidth}-{center}"),
            WaveletTemplate::Morlet => f.write_str("morl"),
        }
    }
}
