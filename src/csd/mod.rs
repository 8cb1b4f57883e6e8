//! Current source density per shank and the merged 20 µm CSD grid.
//!
//! ```text
//! lfp [4, T, C]
//!   ├─ per shank: csd_transform (40 µm, σ = 0.3 S/m)   → [T, C]
//!   ├─ per shank: global z-score                       (gain correction)
//!   ├─ pair sums: shank0 + shank1, shank2 + shank3     → 2 × [T, C]
//!   └─ interleave along channels                       → [T, 2C] at 20 µm
//! ```
//!
//! The z-score runs on each shank before the pairs are summed; normalising
//! after the sum would let a high-gain shank dominate its pair.
pub mod standard;

use ndarray::{s, Array2, Array3, ArrayBase, ArrayView2, Data, Ix2, Ix3};

use crate::error::{Error, Result};
use crate::normalize::zscore_global_inplace;
use crate::probe::{NEUROPIXELS_SHANKS, SHANK_PAIRS};

pub use standard::StandardCsd;

/// Homogeneous extracellular conductivity, S/m.
pub const CONDUCTIVITY_S_PER_M: f64 = 0.3;

/// Micrometres → metres.
pub const UM_TO_M: f64 = 1e-6;

/// Electrode pitch along one shank, µm.
pub const DEFAULT_STEP_UM: f64 = 40.0;

/// Effective pitch of the merged CSD grid, µm.
pub const MERGED_STEP_UM: f64 = DEFAULT_STEP_UM / 2.0;

/// CSD estimation backend.
pub trait CsdSolver {
    /// Estimate CSD from `voltage` [T, C] (volts) recorded at electrode
    /// positions `coords_m` (metres, one per channel) in a medium of
    /// `conductivity` (S/m).  The output has the input's shape.
    fn estimate(
        &self,
        voltage: ArrayView2<'_, f64>,
        coords_m: &[f64],
        conductivity: f64,
    ) -> Result<Array2<f64>>;
}

/// Electrode depths in metres for `n` contacts `step_um` apart.
pub fn electrode_coordinates(n: usize, step_um: f64) -> Vec<f64> {
    (0..n).map(|i| step_um * UM_TO_M * i as f64).collect()
}

/// Orchestrates a [`CsdSolver`] over shanks.
#[derive(Debug, Clone, Default)]
pub struct CsdEngine<S = StandardCsd> {
    solver: S,
}

impl<S: CsdSolver> CsdEngine<S> {
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    /// CSD of one shank's signal [T, C] with contacts `step_um` apart.
    pub fn csd_transform<D>(&self, signal: &ArrayBase<D, Ix2>, step_um: f64) -> Result<Array2<f64>>
    where
        D: Data<Elem = f64>,
    {
        if !(step_um > 0.0 && step_um.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "step_um",
                value: step_um,
                reason: "must be positive and finite",
            });
        }
        let coords = electrode_coordinates(signal.ncols(), step_um);
        let csd = self.solver.estimate(signal.view(), &coords, CONDUCTIVITY_S_PER_M)?;
        if csd.dim() != signal.dim() {
            return Err(Error::Shape {
                expected: signal.shape().to_vec(),
                actual: csd.shape().to_vec(),
            });
        }
        Ok(csd)
    }

    /// Step 1 of the combination: per-shank CSD, each z-scored on its own.
    ///
    /// `lfp`: [4, T, C]  →  [4, T, C]
    pub fn shank_csd<D>(&self, lfp: &ArrayBase<D, Ix3>, step_um: f64) -> Result<Array3<f64>>
    where
        D: Data<Elem = f64>,
    {
        check_shanks(lfp.shape()[0])?;
        let mut out = Array3::<f64>::zeros(lfp.raw_dim());
        for (shank, (src, mut dst)) in lfp.outer_iter().zip(out.outer_iter_mut()).enumerate() {
            let mut csd = self.csd_transform(&src, step_um)?;
            let (mean, std) = zscore_global_inplace(&mut csd);
            log::debug!("shank {shank}: csd mean={mean:.4e} std={std:.4e}");
            dst.assign(&csd);
        }
        Ok(out)
    }

    /// Full combination at the default 40 µm pitch.
    ///
    /// `lfp`: [4, T, C]  →  [T, 2C]
    pub fn combine_to_csd<D>(&self, lfp: &ArrayBase<D, Ix3>) -> Result<Array2<f64>>
    where
        D: Data<Elem = f64>,
    {
        self.combine_to_csd_at(lfp, DEFAULT_STEP_UM)
    }

    /// Full combination with an explicit per-shank pitch.
    pub fn combine_to_csd_at<D>(&self, lfp: &ArrayBase<D, Ix3>, step_um: f64) -> Result<Array2<f64>>
    where
        D: Data<Elem = f64>,
    {
        let csd = self.shank_csd(lfp, step_um)?;
        merge_shank_pairs(&csd)
    }
}

/// Steps 2–3 of the combination: sum each shank pair, then interleave the
/// two sums along the channel axis.
///
/// `csd`: [4, T, C]  →  [T, 2C] with `out[:, 2j] = csd[0, :, j] + csd[1, :, j]`
/// and `out[:, 2j + 1] = csd[2, :, j] + csd[3, :, j]`.
pub fn merge_shank_pairs<D>(csd: &ArrayBase<D, Ix3>) -> Result<Array2<f64>>
where
    D: Data<Elem = f64>,
{
    let (n_shanks, n_sample, n_channel) = csd.dim();
    check_shanks(n_shanks)?;

    let n_pairs = SHANK_PAIRS.len();
    let mut out = Array2::<f64>::zeros((n_sample, n_channel * n_pairs));
    for (k, &(a, b)) in SHANK_PAIRS.iter().enumerate() {
        let sum = &csd.slice(s![a, .., ..]) + &csd.slice(s![b, .., ..]);
        out.slice_mut(s![.., k..;n_pairs]).assign(&sum);
    }
    Ok(out)
}

/// [`CsdEngine::csd_transform`] with the standard solver.
pub fn csd_transform<D>(signal: &ArrayBase<D, Ix2>, step_um: f64) -> Result<Array2<f64>>
where
    D: Data<Elem = f64>,
{
    CsdEngine::<StandardCsd>::default().csd_transform(signal, step_um)
}

/// [`CsdEngine::combine_to_csd`] with the standard solver.
pub fn combine_to_csd<D>(lfp: &ArrayBase<D, Ix3>) -> Result<Array2<f64>>
where
    D: Data<Elem = f64>,
{
    CsdEngine::<StandardCsd>::default().combine_to_csd(lfp)
}

fn check_shanks(n: usize) -> Result<()> {
    if n != NEUROPIXELS_SHANKS {
        return Err(Error::ShankCount { expected: NEUROPIXELS_SHANKS, actual: n });
    }
    Ok(())
}
