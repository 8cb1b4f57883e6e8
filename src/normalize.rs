//! Global z-score normalisation.
//!
//! `zscore_global_inplace` matches `scipy.stats.zscore(x, axis=None)`:
//!   μ = mean(all elements),  σ = std (ddof = 0)
//!   data = (data - μ) / σ
//!
//! Applied to each shank's CSD separately so that amplifier gain
//! differences between shanks do not bias the pairwise sums.
use ndarray::{Array, Dimension};

/// Global z-score over every element of `data`.
/// Returns the (mean, std) used for normalisation.
///
/// A constant array (σ = 0) is centred but not scaled.
pub fn zscore_global_inplace<D: Dimension>(data: &mut Array<f64, D>) -> (f64, f64) {
    if data.is_empty() {
        return (0.0, 0.0);
    }
    let n = data.len() as f64;
    let mean = data.sum() / n;
    let var = data.iter().map(|&v| {
        let d = v - mean; d * d
    }).sum::<f64>() / n;
    let std = var.sqrt();

    if std > 0.0 {
        data.mapv_inplace(|v| (v - mean) / std);
    } else {
        log::warn!("z-score of a constant array: centred only");
        data.mapv_inplace(|v| v - mean);
    }
    (mean, std)
}
