//! Standard (second-difference) CSD estimator.
//!
//! ```text
//! csd[t, i] = -σ · (V[t, i-1] - 2 V[t, i] + V[t, i+1]) / h²
//! ```
//!
//! with `h` the electrode spacing and Vaknin boundary electrodes: the
//! potential at each end contact is duplicated one spacing beyond it, so the
//! estimate has one value per recorded channel.  Same method as iCSD's
//! `StandardCSD(vaknin_el=True)`.
//!
//! Units: volts, metres and S/m in; A/m³ out.
use ndarray::{Array2, ArrayView2, Zip};

use super::CsdSolver;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCsd;

impl CsdSolver for StandardCsd {
    fn estimate(
        &self,
        voltage: ArrayView2<'_, f64>,
        coords_m: &[f64],
        conductivity: f64,
    ) -> Result<Array2<f64>> {
        let n_ch = voltage.ncols();
        if coords_m.len() != n_ch {
            return Err(Error::Shape {
                expected: vec![n_ch],
                actual: vec![coords_m.len()],
            });
        }
        if n_ch < 2 {
            return Err(Error::TooFewElectrodes(n_ch));
        }
        let h = (coords_m[1] - coords_m[0]).abs();
        if !(h > 0.0) {
            return Err(Error::InvalidParameter {
                name: "electrode spacing",
                value: h,
                reason: "must be positive",
            });
        }

        let gain = -conductivity / (h * h);
        let mut csd = Array2::<f64>::zeros(voltage.raw_dim());
        for i in 0..n_ch {
            let prev = voltage.column(i.saturating_sub(1));
            let next = voltage.column((i + 1).min(n_ch - 1));
            Zip::from(csd.column_mut(i))
                .and(prev)
                .and(voltage.column(i))
                .and(next)
                .for_each(|out, &p, &c, &n| *out = gain * (p - 2.0 * c + n));
        }
        Ok(csd)
    }
}
