//! Forward-backward (zero-phase) second-order-section filtering.
//!
//! Matches `scipy.signal.sosfiltfilt(sos, x, axis, padtype='odd')`:
//!
//! 1. Odd-extend each lane by `padlen` samples on both sides.
//! 2. Filter forward with steady-state initial conditions scaled by the
//!    first extended sample.
//! 3. Filter the reversed result the same way, reverse back.
//! 4. Strip the padding.
//!
//! Each section runs in Direct Form II Transposed.
use ndarray::{Array, ArrayView1, Axis, Dimension};

use super::design::Biquad;
use crate::error::{check_axis, Error, Result};

/// Apply `sos` forward and backward along `axis` of `data`, in place.
pub fn sosfiltfilt_inplace<D: Dimension>(
    sos: &[Biquad],
    data: &mut Array<f64, D>,
    axis: Axis,
) -> Result<()> {
    check_axis(axis, data.ndim())?;
    let n = data.len_of(axis);
    let n_pad = padlen(sos);
    if n <= n_pad {
        return Err(Error::SignalTooShort { len: n, padlen: n_pad });
    }

    let zi = sosfilt_zi(sos);
    let mut buf = Vec::with_capacity(n + 2 * n_pad);

    for mut lane in data.lanes_mut(axis) {
        odd_extend_into(lane.view(), n_pad, &mut buf);

        let x0 = buf[0];
        sosfilt_inplace(sos, &mut buf, &zi, x0);

        buf.reverse();
        let y0 = buf[0];
        sosfilt_inplace(sos, &mut buf, &zi, y0);
        buf.reverse();

        for (dst, &src) in lane.iter_mut().zip(&buf[n_pad..n_pad + n]) {
            *dst = src;
        }
    }
    Ok(())
}

/// Default edge padding: `3 * (2 * n_sections + 1 - n_first_order)`.
pub fn padlen(sos: &[Biquad]) -> usize {
    let first_order = sos.iter().filter(|s| s.is_first_order()).count();
    3 * (2 * sos.len() + 1 - first_order)
}

/// Steady-state initial conditions of the cascade for a unit-step input.
///
/// Section `i` sees the step scaled by the DC gain of sections `0..i`.
pub fn sosfilt_zi(sos: &[Biquad]) -> Vec<[f64; 2]> {
    let mut scale = 1.0;
    sos.iter()
        .map(|s| {
            let g = s.dc_gain();
            let zi = [scale * (g - s.b[0]), scale * (s.b[2] - s.a[2] * g)];
            scale *= g;
            zi
        })
        .collect()
}

/// Run the cascade over `x` with initial conditions `zi * x0`.
fn sosfilt_inplace(sos: &[Biquad], x: &mut [f64], zi: &[[f64; 2]], x0: f64) {
    for (s, z0) in sos.iter().zip(zi) {
        let mut z = [z0[0] * x0, z0[1] * x0];
        for v in x.iter_mut() {
            let xin = *v;
            let y = s.b[0] * xin + z[0];
            z[0] = s.b[1] * xin - s.a[1] * y + z[1];
            z[1] = s.b[2] * xin - s.a[2] * y;
            *v = y;
        }
    }
}

/// Odd extension: `2*x[0] - x[n_pad..0]`, `x`, `2*x[-1] - x[-2..-n_pad-2]`.
///
/// Requires `x.len() > n_pad`.
fn odd_extend_into(x: ArrayView1<'_, f64>, n_pad: usize, out: &mut Vec<f64>) {
    let n = x.len();
    let first = x[0];
    let last = x[n - 1];
    out.clear();
    out.extend((1..=n_pad).rev().map(|i| 2.0 * first - x[i]));
    out.extend(x.iter().copied());
    out.extend((1..=n_pad).map(|i| 2.0 * last - x[n - 1 - i]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::design::{butter_sos, BandType};
    use ndarray::{arr1, Array1, Array2};

    #[test]
    fn odd_extension_layout() {
        let x = arr1(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut out = Vec::new();
        odd_extend_into(x.view(), 3, &mut out);
        // left: 2*1 - 4, 2*1 - 3, 2*1 - 2; right: 2*5 - 4, 2*5 - 3, 2*5 - 2
        assert_eq!(out, vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn padlen_matches_scipy_default() {
        assert_eq!(padlen(&butter_sos(BandType::Lowpass, 4, 0.2).unwrap()), 15);
        assert_eq!(padlen(&butter_sos(BandType::Lowpass, 3, 0.2).unwrap()), 12);
    }

    #[test]
    fn lowpass_passes_constant_exactly() {
        let sos = butter_sos(BandType::Lowpass, 4, 0.24).unwrap();
        let mut x = Array1::from_elem(200, 3.5);
        sosfiltfilt_inplace(&sos, &mut x, Axis(0)).unwrap();
        for &v in x.iter() {
            approx::assert_abs_diff_eq!(v, 3.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn zero_phase_keeps_peak_position() {
        let sos = butter_sos(BandType::Lowpass, 4, 0.1).unwrap();
        let mut x = Array1::<f64>::zeros(401);
        x[200] = 1.0;
        sosfiltfilt_inplace(&sos, &mut x, Axis(0)).unwrap();
        let peak = x
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 200);
        for k in 1..100 {
            approx::assert_abs_diff_eq!(x[200 - k], x[200 + k], epsilon = 1e-9);
        }
    }

    #[test]
    fn filters_each_lane_independently() {
        let sos = butter_sos(BandType::Highpass, 2, 0.05).unwrap();
        let mut data = Array2::from_shape_fn((128, 3), |(t, c)| {
            if c == 1 { 7.0 } else { (t as f64 * 0.7).sin() }
        });
        sosfiltfilt_inplace(&sos, &mut data, Axis(0)).unwrap();
        for &v in data.column(1).iter() {
            approx::assert_abs_diff_eq!(v, 0.0, epsilon = 1e-9);
        }
        assert!(data.column(0).iter().any(|v| v.abs() > 0.1));
    }

    #[test]
    fn too_short_signal_is_rejected() {
        let sos = butter_sos(BandType::Lowpass, 4, 0.2).unwrap();
        let mut x = Array1::<f64>::zeros(15);
        let err = sosfiltfilt_inplace(&sos, &mut x, Axis(0)).unwrap_err();
        assert!(matches!(err, Error::SignalTooShort { len: 15, padlen: 15 }));
    }
}
