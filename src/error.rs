//! Error type shared by every pipeline stage.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata: missing required key `{0}`")]
    MissingMetaKey(String),

    #[error("metadata line {line}: expected `key=value`, got {text:?}")]
    MalformedMetaLine { line: usize, text: String },

    #[error("metadata key `{key}`: cannot parse {value:?}")]
    InvalidMetaValue { key: String, value: String },

    #[error("channel count must be positive")]
    NoChannels,

    #[error("raw file {} holds {actual} bytes, metadata needs {expected}", path.display())]
    FileTooShort {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("cannot view mapped bytes as i16 samples: {0:?}")]
    SampleCast(bytemuck::PodCastError),

    #[error("sample window {start}..{end} out of range for {n_samples} samples")]
    SampleRange {
        start: usize,
        end: usize,
        n_samples: usize,
    },

    #[error("{channels} channels cannot be split evenly across {shanks} shanks")]
    ChannelsNotDivisible { channels: usize, shanks: usize },

    #[error("expected {expected} shanks, got {actual}")]
    ShankCount { expected: usize, actual: usize },

    #[error("{name} = {value} um is not an integer multiple of step {step} um")]
    NotStepMultiple {
        name: &'static str,
        value: f64,
        step: f64,
    },

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("cutoff {cutoff_hz} Hz at {sample_rate} Hz normalises to {normalized}, outside (0, 1)")]
    InvalidCutoff {
        cutoff_hz: f64,
        sample_rate: f64,
        normalized: f64,
    },

    #[error("filter order must be at least 1")]
    InvalidOrder,

    #[error("axis {axis} out of bounds for a {ndim}-D array")]
    AxisOutOfBounds { axis: usize, ndim: usize },

    #[error("signal has {len} samples along the filtered axis, needs more than {padlen}")]
    SignalTooShort { len: usize, padlen: usize },

    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    Shape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("CSD needs at least 2 electrodes, got {0}")]
    TooFewElectrodes(usize),

    #[error("unknown wavelet template {0:?}")]
    UnknownWavelet(String),
}

impl Error {
    /// True for errors caused by caller-supplied parameters or metadata,
    /// as opposed to I/O failures or malformed files.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::MissingMetaKey(_)
                | Error::NoChannels
                | Error::ChannelsNotDivisible { .. }
                | Error::ShankCount { .. }
                | Error::NotStepMultiple { .. }
                | Error::InvalidParameter { .. }
                | Error::InvalidCutoff { .. }
                | Error::InvalidOrder
                | Error::AxisOutOfBounds { .. }
                | Error::UnknownWavelet(_)
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fail with [`Error::AxisOutOfBounds`] unless `axis < ndim`.
pub(crate) fn check_axis(axis: ndarray::Axis, ndim: usize) -> Result<()> {
    if axis.index() >= ndim {
        return Err(Error::AxisOutOfBounds { axis: axis.index(), ndim });
    }
    Ok(())
}
