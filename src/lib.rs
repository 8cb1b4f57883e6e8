//! # npx-lfp: multi-shank Neuropixels LFP and CSD in pure Rust
//!
//! `npx-lfp` turns a raw four-shank Neuropixels LF recording (SpikeGLX
//! `.bin` + `.meta`) into per-shank local field potentials, a current
//! source density merged onto a 20 µm grid, and optional single-band
//! wavelet coefficients.
//!
//! ## Pipeline overview
//!
//! ```text
//! run_g0_t0.imec0.lf.bin (+ .meta)
//!   │
//!   ├─ spikeglx::RawRecording   memory-mapped [T, C] i16, no copy
//!   ├─ demux                    raw channel k → shank k % 4, local k / 4
//!   ├─ reference                per-sample channel mean removed (per shank)
//!   ├─ filter (Butterworth)     highpass 1 Hz, lowpass 300 Hz, zero-phase
//!   │     └─→ lfp  [4, T, C/4]
//!   ├─ csd                      −σ ∂²V/∂z², 40 µm pitch, σ = 0.3 S/m
//!   ├─ normalize (z-score)      per shank, before pairing
//!   └─ pair + interleave        (0 + 1), (2 + 3) → 20 µm grid
//!         └─→ csd  [T, C/2]
//!
//! wavelet::wavelet_transform    any of the above → one complex band
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use npx_lfp::{process_recording, PipelineConfig};
//!
//! let cfg = PipelineConfig::default();
//! let (lfp, csd) = process_recording("data/run_g0_t0.imec0.lf.bin", &cfg).unwrap();
//! println!("lfp {:?}, csd {:?}", lfp.dim(), csd.dim());
//! ```
//!
//! ## Running individual steps
//!
//! ```no_run
//! use npx_lfp::spikeglx::RawRecording;
//! use npx_lfp::{combine_to_csd, demux_to_shank_lfp, wavelet_transform, PipelineConfig};
//! use ndarray::Axis;
//!
//! let raw = RawRecording::open("data/run_g0_t0.imec0.lf.bin").unwrap();
//! let window = raw.read_slice(0, 25_000).unwrap();           // [T, C] f64
//!
//! let lfp = demux_to_shank_lfp(&window, &PipelineConfig::default()).unwrap();
//! let csd = combine_to_csd(&lfp).unwrap();                    // [T, 2 * C/4]
//! let theta = wavelet_transform(&csd, 2500.0, 7.0, "cmor1.5-1.0", Axis(0)).unwrap();
//! ```

pub mod config;
pub mod csd;
pub mod demux;
pub mod error;
pub mod filter;
pub mod io;
pub mod normalize;
pub mod probe;
pub mod reference;
pub mod spikeglx;
pub mod wavelet;

use std::path::Path;

use ndarray::{Array2, Array3, ArrayBase, Data, Ix2, Ix3};

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use config::{PipelineConfig, WaveletConfig};

pub use csd::{
    combine_to_csd, csd_transform, electrode_coordinates, merge_shank_pairs,
    CsdEngine, CsdSolver, StandardCsd,
    CONDUCTIVITY_S_PER_M, DEFAULT_STEP_UM, MERGED_STEP_UM, UM_TO_M,
};

pub use demux::{demux_to_shank_lfp, demux_to_shank_lfp_with};

pub use error::{Error, Result};

pub use filter::{
    highpass, lowpass, spatial_smooth,
    Butterworth, FilterBank, Gaussian, Smoother, ZeroPhaseFilter, DEFAULT_ORDER,
};

pub use io::StWriter;

pub use normalize::zscore_global_inplace;

pub use probe::{ShankMap, Site, NEUROPIXELS_SHANKS, SHANK_PAIRS};

pub use reference::common_average_reference_inplace;

pub use spikeglx::{meta_path_for, Meta, RawRecording};

pub use wavelet::{wavelet_transform, ContinuousWavelet, ConvolutionCwt, WaveletEngine, WaveletTemplate};

/// Raw `[T, C]` samples → per-shank LFP `[4, T, C / 4]`.
///
/// Same as [`demux_to_shank_lfp`]; named for symmetry with
/// [`neuropixels_csd`].
///
/// # Errors
///
/// * [`Error::NoChannels`] if `raw` has no channels.
/// * [`Error::ChannelsNotDivisible`] if `C` is not a multiple of 4.
/// * Filter errors ([`Error::InvalidCutoff`], [`Error::SignalTooShort`], …)
///   from the band filters.
pub fn neuropixels_lfp<S, A>(raw: &ArrayBase<S, Ix2>, cfg: &PipelineConfig) -> Result<Array3<f64>>
where
    S: Data<Elem = A>,
    A: Copy + Into<f64>,
{
    demux_to_shank_lfp(raw, cfg)
}

/// Per-shank LFP `[4, T, C]` → merged CSD `[T, 2C]` at
/// `cfg.step_um / 2` pitch.
pub fn neuropixels_csd<S>(lfp: &ArrayBase<S, Ix3>, cfg: &PipelineConfig) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    CsdEngine::<StandardCsd>::default().combine_to_csd_at(lfp, cfg.step_um)
}

/// Run the **full LFP + CSD pipeline** on a SpikeGLX recording.
///
/// Opens `bin` (and its `.meta`), maps it, and runs [`neuropixels_lfp`]
/// followed by [`neuropixels_csd`] over every sample.  The sampling rate in
/// `cfg` is used as given; callers wanting the rate from the metadata read
/// [`RawRecording::sample_rate`] first.
///
/// # Returns
///
/// `(lfp, csd)` with shapes `[4, T, C / 4]` and `[T, C / 2]`.
///
/// # Examples
///
/// ```no_run
/// use npx_lfp::{process_recording, PipelineConfig};
///
/// let cfg = PipelineConfig { lowpass_hz: 150.0, ..PipelineConfig::default() };
/// let (lfp, csd) = process_recording("run_g0_t0.imec0.lf.bin", &cfg).unwrap();
/// assert_eq!(csd.ncols(), 2 * lfp.shape()[2]);
/// ```
pub fn process_recording(
    bin: impl AsRef<Path>,
    cfg: &PipelineConfig,
) -> Result<(Array3<f64>, Array2<f64>)> {
    let raw = RawRecording::open(bin)?;
    if let Some(fs) = raw.sample_rate() {
        if (fs - cfg.sample_rate).abs() > 1e-6 * fs {
            log::warn!("metadata sample rate {fs} Hz differs from configured {} Hz", cfg.sample_rate);
        }
    }
    let lfp = neuropixels_lfp(&raw.view()?, cfg)?;
    let csd = neuropixels_csd(&lfp, cfg)?;
    raw.close();
    Ok((lfp, csd))
}
