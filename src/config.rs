//! Pipeline configuration.
//!
//! [`PipelineConfig`] holds every tunable parameter of the LFP/CSD pipeline
//! and [`WaveletConfig`] those of the optional time–frequency step.  The
//! defaults are the values used for Neuropixels 2.0 four-shank LFP data
//! (`*.lf.bin`, 2500 Hz).

/// Configuration for demultiplexing, filtering and CSD estimation.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use npx_lfp::PipelineConfig;
///
/// let cfg = PipelineConfig {
///     lowpass_hz: 150.0,  // narrower LFP band
///     ..PipelineConfig::default()
/// };
/// assert_eq!(cfg.sample_rate, 2500.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Sampling rate of the raw recording in Hz.
    ///
    /// Default: `2500.0` Hz (Neuropixels LF band).
    pub sample_rate: f64,

    /// Highpass cutoff applied after common-average referencing, in Hz.
    ///
    /// Default: `1.0` Hz.
    pub highpass_hz: f64,

    /// Lowpass cutoff applied after the highpass, in Hz.
    ///
    /// Default: `300.0` Hz.
    pub lowpass_hz: f64,

    /// Butterworth order of both band filters.  Forward-backward filtering
    /// doubles the effective order.
    ///
    /// Default: `4`.
    pub filter_order: usize,

    /// Electrode spacing along one shank in micrometres, used for the
    /// per-shank CSD.  Paired shanks merge to half this spacing.
    ///
    /// Default: `40.0` µm.
    pub step_um: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 2500.0,
            highpass_hz: 1.0,
            lowpass_hz: 300.0,
            filter_order: crate::filter::DEFAULT_ORDER,
            step_um: crate::csd::DEFAULT_STEP_UM,
        }
    }
}

/// Configuration for a single-band wavelet decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveletConfig {
    /// Sampling rate of the analysed signal in Hz.
    ///
    /// Default: `2500.0` Hz.
    pub sample_rate: f64,

    /// Centre frequency of the extracted band in Hz.
    ///
    /// Default: `7.0` Hz (theta).
    pub cycle_hz: f64,

    /// Wavelet template name, e.g. `cmor1.5-1.0` or `morl`.
    ///
    /// Default: `cmor1.5-1.0`.
    pub template: String,
}

impl Default for WaveletConfig {
    fn default() -> Self {
        Self {
            sample_rate: 2500.0,
            cycle_hz: 7.0,
            template: "cmor1.5-1.0".to_string(),
        }
    }
}

impl WaveletConfig {
    /// Requested frequency in cycles per sample.
    ///
    /// ```
    /// use npx_lfp::WaveletConfig;
    /// let cfg = WaveletConfig::default();
    /// assert!((cfg.cycles_per_sample() - 0.0028).abs() < 1e-12);
    /// ```
    pub fn cycles_per_sample(&self) -> f64 {
        self.cycle_hz / self.sample_rate
    }
}
