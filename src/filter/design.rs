//! Butterworth filter design as second-order sections.
//!
//! Matches `scipy.signal.butter(N, Wn, btype, output='sos')` up to section
//! ordering: every conjugate pole pair of the analog prototype
//!
//! ```text
//!   s² + q_k s + 1,   q_k = 2 sin(π (2k + 1) / 2N)
//! ```
//!
//! is mapped through the bilinear transform with pre-warped cutoff
//! `K = tan(π Wn / 2)`, where `Wn` is the cutoff as a fraction of Nyquist.
//! Odd orders add one first-order section (zero `b2`/`a2`).
use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Band type of a Butterworth design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandType {
    Lowpass,
    Highpass,
}

/// One second-order section, `a[0] == 1`.
///
/// `H(z) = (b0 + b1 z⁻¹ + b2 z⁻²) / (1 + a1 z⁻¹ + a2 z⁻²)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

impl Biquad {
    /// DC gain `sum(b) / sum(a)`.
    #[inline]
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }

    /// True for a padded first-order section.
    #[inline]
    pub fn is_first_order(&self) -> bool {
        self.b[2] == 0.0 && self.a[2] == 0.0
    }
}

/// Design an order-`order` Butterworth filter with normalised cutoff `wn`
/// (fraction of Nyquist, strictly inside `(0, 1)`).
pub fn butter_sos(band: BandType, order: usize, wn: f64) -> Result<Vec<Biquad>> {
    if order == 0 {
        return Err(Error::InvalidOrder);
    }
    if !(wn > 0.0 && wn < 1.0) {
        return Err(Error::InvalidParameter {
            name: "wn",
            value: wn,
            reason: "normalised cutoff must lie in (0, 1)",
        });
    }

    let k = (PI * wn / 2.0).tan();
    let k2 = k * k;
    let mut sos = Vec::with_capacity(order.div_ceil(2));

    for i in 0..order / 2 {
        let q = 2.0 * (PI * (2 * i + 1) as f64 / (2 * order) as f64).sin();
        let a0 = 1.0 + q * k + k2;
        let a = [1.0, 2.0 * (k2 - 1.0) / a0, (1.0 - q * k + k2) / a0];
        let b = match band {
            BandType::Lowpass => {
                let g = k2 / a0;
                [g, 2.0 * g, g]
            }
            BandType::Highpass => {
                let g = 1.0 / a0;
                [g, -2.0 * g, g]
            }
        };
        sos.push(Biquad { b, a });
    }

    if order % 2 == 1 {
        let a0 = 1.0 + k;
        let a = [1.0, (k - 1.0) / a0, 0.0];
        let b = match band {
            BandType::Lowpass => [k / a0, k / a0, 0.0],
            BandType::Highpass => [1.0 / a0, -1.0 / a0, 0.0],
        };
        sos.push(Biquad { b, a });
    }

    Ok(sos)
}

/// Magnitude response `|H(e^{jω})|` of the cascade at normalised frequency
/// `w` (fraction of Nyquist).
pub fn sos_magnitude(sos: &[Biquad], w: f64) -> f64 {
    let omega = PI * w;
    let (c1, s1) = (omega.cos(), -omega.sin());
    let (c2, s2) = ((2.0 * omega).cos(), -(2.0 * omega).sin());
    sos.iter()
        .map(|s| {
            let num_re = s.b[0] + s.b[1] * c1 + s.b[2] * c2;
            let num_im = s.b[1] * s1 + s.b[2] * s2;
            let den_re = s.a[0] + s.a[1] * c1 + s.a[2] * c2;
            let den_im = s.a[1] * s1 + s.a[2] * s2;
            (num_re.hypot(num_im)) / (den_re.hypot(den_im))
        })
        .product()
}
