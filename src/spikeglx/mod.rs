//! SpikeGLX recordings: `.meta` sidecar plus memory-mapped `.bin` samples.
pub mod meta;
pub mod raw;

pub use meta::{meta_path_for, Meta};
pub use raw::RawRecording;
