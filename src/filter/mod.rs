//! Temporal band filters and spatial smoothing.
//!
//! - [`design`]: Butterworth second-order sections, matching
//!   `scipy.signal.butter(output='sos')`.
//! - [`apply`]: forward-backward filtering, matching
//!   `scipy.signal.sosfiltfilt`.
//! - [`smooth`]: Gaussian smoothing, matching
//!   `scipy.ndimage.gaussian_filter1d`.
//!
//! [`FilterBank`] is the parameter-checking layer the pipeline talks to.  It
//! reaches the numerics only through the [`ZeroPhaseFilter`] and
//! [`Smoother`] traits, so the pipeline can run against stub backends.
pub mod apply;
pub mod design;
pub mod smooth;

use ndarray::{Array, ArrayBase, Axis, Data, Dimension};

use crate::error::{check_axis, Error, Result};

pub use apply::{padlen, sosfilt_zi, sosfiltfilt_inplace};
pub use design::{butter_sos, sos_magnitude, BandType, Biquad};
pub use smooth::{gaussian_filter1d_inplace, gaussian_kernel};

/// Butterworth order used when the caller has no preference.
pub const DEFAULT_ORDER: usize = 4;

/// Filter design + zero-phase application backend.
pub trait ZeroPhaseFilter {
    /// Filter representation produced by [`design`](Self::design).
    type Design;

    /// Design a `band` filter of `order` with `cutoff` as a fraction of
    /// Nyquist in `(0, 1)`.
    fn design(&self, band: BandType, order: usize, cutoff: f64) -> Result<Self::Design>;

    /// Filter `signal` forward and backward along `axis`.  The output has
    /// the input's shape.
    fn filtfilt<D: Dimension>(
        &self,
        design: &Self::Design,
        signal: Array<f64, D>,
        axis: Axis,
    ) -> Result<Array<f64, D>>;
}

/// Spatial smoothing backend.
pub trait Smoother {
    /// Smooth `signal` along `axis`; `sigma` and `radius` are in samples.
    fn smooth<D: Dimension>(
        &self,
        signal: Array<f64, D>,
        axis: Axis,
        sigma: f64,
        radius: usize,
    ) -> Result<Array<f64, D>>;
}

/// Butterworth SOS design applied with `sosfiltfilt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Butterworth;

impl ZeroPhaseFilter for Butterworth {
    type Design = Vec<Biquad>;

    fn design(&self, band: BandType, order: usize, cutoff: f64) -> Result<Vec<Biquad>> {
        butter_sos(band, order, cutoff)
    }

    fn filtfilt<D: Dimension>(
        &self,
        design: &Vec<Biquad>,
        mut signal: Array<f64, D>,
        axis: Axis,
    ) -> Result<Array<f64, D>> {
        sosfiltfilt_inplace(design, &mut signal, axis)?;
        Ok(signal)
    }
}

/// Gaussian kernel smoothing with reflective boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gaussian;

impl Smoother for Gaussian {
    fn smooth<D: Dimension>(
        &self,
        mut signal: Array<f64, D>,
        axis: Axis,
        sigma: f64,
        radius: usize,
    ) -> Result<Array<f64, D>> {
        gaussian_filter1d_inplace(&mut signal, axis, sigma, radius)?;
        Ok(signal)
    }
}

/// Lowpass, highpass and spatial smoothing over arrays of any element type
/// convertible to `f64`.  Outputs always have the input's shape.
#[derive(Debug, Clone, Default)]
pub struct FilterBank<F = Butterworth, G = Gaussian> {
    filter: F,
    smoother: G,
}

impl<F: ZeroPhaseFilter, G: Smoother> FilterBank<F, G> {
    pub fn new(filter: F, smoother: G) -> Self {
        Self { filter, smoother }
    }

    /// Zero-phase Butterworth lowpass at `cutoff_hz` along `axis`.
    pub fn lowpass<S, A, D>(
        &self,
        signal: &ArrayBase<S, D>,
        sample_rate: f64,
        cutoff_hz: f64,
        order: usize,
        axis: Axis,
    ) -> Result<Array<f64, D>>
    where
        S: Data<Elem = A>,
        A: Copy + Into<f64>,
        D: Dimension,
    {
        self.band(BandType::Lowpass, signal, sample_rate, cutoff_hz, order, axis)
    }

    /// Zero-phase Butterworth highpass at `cutoff_hz` along `axis`.
    pub fn highpass<S, A, D>(
        &self,
        signal: &ArrayBase<S, D>,
        sample_rate: f64,
        cutoff_hz: f64,
        order: usize,
        axis: Axis,
    ) -> Result<Array<f64, D>>
    where
        S: Data<Elem = A>,
        A: Copy + Into<f64>,
        D: Dimension,
    {
        self.band(BandType::Highpass, signal, sample_rate, cutoff_hz, order, axis)
    }

    /// Gaussian smoothing along the channel `axis`, with all lengths in
    /// micrometres.
    ///
    /// `std_um` and `radius_um` must be exact multiples of `step_um`; they
    /// are converted to channel-step counts before smoothing.
    pub fn spatial_smooth<S, A, D>(
        &self,
        signal: &ArrayBase<S, D>,
        step_um: f64,
        std_um: f64,
        radius_um: f64,
        axis: Axis,
    ) -> Result<Array<f64, D>>
    where
        S: Data<Elem = A>,
        A: Copy + Into<f64>,
        D: Dimension,
    {
        if !(step_um > 0.0 && step_um.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "step_um",
                value: step_um,
                reason: "must be positive and finite",
            });
        }
        if !(std_um > 0.0) {
            return Err(Error::InvalidParameter {
                name: "std_um",
                value: std_um,
                reason: "must be positive",
            });
        }
        if !(radius_um >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "radius_um",
                value: radius_um,
                reason: "must be non-negative",
            });
        }
        let std = steps("std_um", std_um, step_um)?;
        let radius = steps("radius_um", radius_um, step_um)?;
        check_axis(axis, signal.ndim())?;

        log::trace!("spatial smooth: sigma={std} radius={radius} steps");
        self.smoother.smooth(signal.mapv(Into::into), axis, std as f64, radius)
    }

    fn band<S, A, D>(
        &self,
        band: BandType,
        signal: &ArrayBase<S, D>,
        sample_rate: f64,
        cutoff_hz: f64,
        order: usize,
        axis: Axis,
    ) -> Result<Array<f64, D>>
    where
        S: Data<Elem = A>,
        A: Copy + Into<f64>,
        D: Dimension,
    {
        if order == 0 {
            return Err(Error::InvalidOrder);
        }
        let normalized = cutoff_hz / (sample_rate / 2.0);
        if !(normalized > 0.0 && normalized < 1.0) {
            return Err(Error::InvalidCutoff { cutoff_hz, sample_rate, normalized });
        }
        check_axis(axis, signal.ndim())?;

        log::trace!("{band:?} order={order} cutoff={cutoff_hz} Hz (Wn={normalized:.6})");
        let design = self.filter.design(band, order, normalized)?;
        self.filter.filtfilt(&design, signal.mapv(Into::into), axis)
    }
}

/// `value / step` as a whole number of steps, or an error if `value` is not
/// an exact multiple of `step`.
fn steps(name: &'static str, value: f64, step: f64) -> Result<usize> {
    if value % step != 0.0 {
        return Err(Error::NotStepMultiple { name, value, step });
    }
    Ok((value / step) as usize)
}

/// [`FilterBank::lowpass`] with the default backends.
pub fn lowpass<S, A, D>(
    signal: &ArrayBase<S, D>,
    sample_rate: f64,
    cutoff_hz: f64,
    order: usize,
    axis: Axis,
) -> Result<Array<f64, D>>
where
    S: Data<Elem = A>,
    A: Copy + Into<f64>,
    D: Dimension,
{
    FilterBank::<Butterworth, Gaussian>::default().lowpass(signal, sample_rate, cutoff_hz, order, axis)
}

/// [`FilterBank::highpass`] with the default backends.
pub fn highpass<S, A, D>(
    signal: &ArrayBase<S, D>,
    sample_rate: f64,
    cutoff_hz: f64,
    order: usize,
    axis: Axis,
) -> Result<Array<f64, D>>
where
    S: Data<Elem = A>,
    A: Copy + Into<f64>,
    D: Dimension,
{
    FilterBank::<Butterworth, Gaussian>::default().highpass(signal, sample_rate, cutoff_hz, order, axis)
}

/// [`FilterBank::spatial_smooth`] with the default backends.
pub fn spatial_smooth<S, A, D>(
    signal: &ArrayBase<S, D>,
    step_um: f64,
    std_um: f64,
    radius_um: f64,
    axis: Axis,
) -> Result<Array<f64, D>>
where
    S: Data<Elem = A>,
    A: Copy + Into<f64>,
    D: Dimension,
{
    FilterBank::<Butterworth, Gaussian>::default().spatial_smooth(signal, step_um, std_um, radius_um, axis)
}
