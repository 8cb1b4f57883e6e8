//! Common-average reference across the channels of one shank.
//!
//! `data`: [T, C]  →  `data[t, c] -= mean(data[t, :])`
//!
//! Removes signal shared by every channel at a time point (reference
//! electrode drift, common-mode pickup) before band filtering.
use ndarray::{Array2, Axis};

pub fn common_average_reference_inplace(data: &mut Array2<f64>) {
    let Some(means) = data.mean_axis(Axis(1)) else {
        return;
    };
    for mut col in data.columns_mut() {
        col -= &means;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn channel_sum_is_zero_after_reference() {
        let mut data = Array2::from_shape_fn((512, 8), |(t, c)| {
            ((c * 7 + t * 3) as f64).sin()
        });
        common_average_reference_inplace(&mut data);
        let row_sums = data.sum_axis(Axis(1));
        for &s in row_sums.iter() {
            approx::assert_abs_diff_eq!(s, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn reference_of_constant_gives_zero() {
        let mut data = Array2::from_elem((100, 4), 5.0);
        common_average_reference_inplace(&mut data);
        for &v in data.iter() {
            approx::assert_abs_diff_eq!(v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn reference_preserves_channel_differences() {
        let mut data = Array2::from_shape_fn((10, 2), |(_, c)| if c == 0 { 2.0 } else { 4.0 });
        common_average_reference_inplace(&mut data);
        for t in 0..10 {
            approx::assert_abs_diff_eq!(data[[t, 0]] - data[[t, 1]], -2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn no_channels_is_a_no_op() {
        let mut data = Array2::<f64>::zeros((10, 0));
        common_average_reference_inplace(&mut data);
        assert_eq!(data.dim(), (10, 0));
    }
}
