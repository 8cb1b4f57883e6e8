//! Raw interleaved recording → per-shank LFP.
//!
//! For every shank:
//!
//! 1. pick the shank's raw channels ([`ShankMap`]),
//! 2. subtract the per-sample channel mean ([`common_average_reference_inplace`]),
//! 3. highpass then lowpass along the sample axis ([`FilterBank`]).
//!
//! `raw`: [T, C]  →  `lfp`: [n_shanks, T, C / n_shanks]
use ndarray::{s, Array2, Array3, ArrayBase, Axis, Data, Ix2};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::filter::{Butterworth, FilterBank, Gaussian, Smoother, ZeroPhaseFilter};
use crate::probe::ShankMap;
use crate::reference::common_average_reference_inplace;

/// Demultiplex a Neuropixels recording into four shanks of LFP, using the
/// default filter backends.
pub fn demux_to_shank_lfp<S, A>(raw: &ArrayBase<S, Ix2>, cfg: &PipelineConfig) -> Result<Array3<f64>>
where
    S: Data<Elem = A>,
    A: Copy + Into<f64>,
{
    demux_to_shank_lfp_with(&FilterBank::<Butterworth, Gaussian>::default(), &ShankMap::neuropixels(), raw, cfg)
}

/// Demultiplex `raw` with an explicit filter bank and channel map.
pub fn demux_to_shank_lfp_with<F, G, S, A>(
    bank: &FilterBank<F, G>,
    map: &ShankMap,
    raw: &ArrayBase<S, Ix2>,
    cfg: &PipelineConfig,
) -> Result<Array3<f64>>
where
    F: ZeroPhaseFilter,
    G: Smoother,
    S: Data<Elem = A>,
    A: Copy + Into<f64>,
{
    let (n_sample, n_raw) = raw.dim();
    if n_raw == 0 {
        return Err(Error::NoChannels);
    }
    let n_shanks = map.n_shanks();
    let n_channel = map
        .channels_per_shank(n_raw)
        .ok_or(Error::ChannelsNotDivisible { channels: n_raw, shanks: n_shanks })?;

    log::debug!(
        "demux: {n_sample} samples x {n_raw} ch -> {n_shanks} shanks x {n_channel} ch \
         (hp {} Hz, lp {} Hz, order {}, fs {} Hz)",
        cfg.highpass_hz, cfg.lowpass_hz, cfg.filter_order, cfg.sample_rate,
    );

    let mut lfp = Array3::<f64>::zeros((n_shanks, n_sample, n_channel));
    for shank in 0..n_shanks {
        let channels = map.shank_channels(shank, n_raw);
        let mut sig: Array2<f64> = raw.select(Axis(1), &channels).mapv(Into::into);
        common_average_reference_inplace(&mut sig);
        let sig = bank.highpass(&sig, cfg.sample_rate, cfg.highpass_hz, cfg.filter_order, Axis(0))?;
        let sig = bank.lowpass(&sig, cfg.sample_rate, cfg.lowpass_hz, cfg.filter_order, Axis(0))?;
        lfp.slice_mut(s![shank, .., ..]).assign(&sig);
        log::trace!("shank {shank}: channels {channels:?}");
    }
    Ok(lfp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{BandType, Gaussian};
    use ndarray::{Array, Dimension};

    /// Filter backend that leaves the signal untouched.
    struct Identity;

    impl ZeroPhaseFilter for Identity {
        type Design = ();

        fn design(&self, _: BandType, _: usize, _: f64) -> Result<()> {
            Ok(())
        }

        fn filtfilt<D: Dimension>(&self, _: &(), signal: Array<f64, D>, _: Axis) -> Result<Array<f64, D>> {
            Ok(signal)
        }
    }

    #[test]
    fn channels_land_on_their_shank() {
        // raw[t, c] = 100 * c  → after CAR, shank s local j holds 100*(4j+s) - mean.
        let raw = Array2::from_shape_fn((8, 12), |(_, c)| 100 * c as i16);
        let bank = FilterBank::new(Identity, Gaussian);
        let lfp = demux_to_shank_lfp_with(&bank, &ShankMap::neuropixels(), &raw, &PipelineConfig::default()).unwrap();
        assert_eq!(lfp.dim(), (4, 8, 3));
        for shank in 0..4 {
            let mean = (0..3).map(|j| 100.0 * (4 * j + shank) as f64).sum::<f64>() / 3.0;
            for j in 0..3 {
                let expected = 100.0 * (4 * j + shank) as f64 - mean;
                approx::assert_abs_diff_eq!(lfp[[shank, 5, j]], expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn uneven_channel_count_fails_fast() {
        let raw = Array2::<f64>::zeros((100, 10));
        let err = demux_to_shank_lfp(&raw, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::ChannelsNotDivisible { channels: 10, shanks: 4 }));
        assert!(err.is_config());
    }
}
