//! 1-D Gaussian smoothing along one axis.
//!
//! Matches `scipy.ndimage.gaussian_filter1d(x, sigma, radius=radius,
//! mode='reflect')`: a normalised kernel `exp(-x² / 2σ²)` over
//! `[-radius, radius]`, with the half-sample symmetric boundary
//! `d c b a | a b c d | d c b a`.
use ndarray::{Array, Axis, Dimension};

use crate::error::{check_axis, Error, Result};

/// Normalised Gaussian kernel of length `2 * radius + 1`.
pub fn gaussian_kernel(sigma: f64, radius: usize) -> Vec<f64> {
    let r = radius as isize;
    let inv = -0.5 / (sigma * sigma);
    let mut k: Vec<f64> = (-r..=r).map(|x| (inv * (x * x) as f64).exp()).collect();
    let s: f64 = k.iter().sum();
    k.iter_mut().for_each(|v| *v /= s);
    k
}

/// Smooth `data` along `axis` in place.  `sigma` and `radius` are in
/// samples along that axis.
pub fn gaussian_filter1d_inplace<D: Dimension>(
    data: &mut Array<f64, D>,
    axis: Axis,
    sigma: f64,
    radius: usize,
) -> Result<()> {
    check_axis(axis, data.ndim())?;
    if !(sigma > 0.0 && sigma.is_finite()) {
        return Err(Error::InvalidParameter {
            name: "sigma",
            value: sigma,
            reason: "must be positive and finite",
        });
    }
    let n = data.len_of(axis);
    if n == 0 {
        return Ok(());
    }

    let kernel = gaussian_kernel(sigma, radius);
    let r = radius as isize;
    let mut src = vec![0.0; n];

    for mut lane in data.lanes_mut(axis) {
        src.iter_mut().zip(lane.iter()).for_each(|(d, &s)| *d = s);
        for (i, out) in lane.iter_mut().enumerate() {
            *out = kernel
                .iter()
                .enumerate()
                .map(|(j, &w)| w * src[reflect(i as isize + j as isize - r, n)])
                .sum();
        }
    }
    Ok(())
}

/// Map an out-of-range index back into `0..n` by symmetric reflection.
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    let m = i.rem_euclid(2 * n);
    (if m < n { m } else { 2 * n - 1 - m }) as usize
}
