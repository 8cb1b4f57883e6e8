//! SpikeGLX `.meta` sidecar.
//!
//! One `key=value` pair per line.  Some keys carry a `~` prefix
//! (`~imroTbl=(...)`, `~snsChanMap=(...)`); it is stripped, so they are
//! looked up without it.  Values are kept as text and parsed on access.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Parsed `.meta` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    entries: HashMap<String, String>,
}

impl Meta {
    /// Read and parse a `.meta` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&text)
    }

    /// Parse `.meta` text.  Blank lines are skipped; any other line without
    /// an `=` is an error.  Values may themselves contain `=`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = HashMap::new();
        for (i, line) in text.lines().enumerate() {
            let kv = line.trim().trim_matches('~');
            if kv.is_empty() {
                continue;
            }
            let (key, value) = kv.split_once('=').ok_or_else(|| Error::MalformedMetaLine {
                line: i + 1,
                text: line.to_string(),
            })?;
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(Self { entries })
    }

    /// Raw text of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// `key` parsed as `T`; missing or unparsable values are errors.
    pub fn require<T: FromStr>(&self, key: &str) -> Result<T> {
        let value = self.get(key).ok_or_else(|| Error::MissingMetaKey(key.to_string()))?;
        value.parse().map_err(|_| Error::InvalidMetaValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Number of channels saved in the binary file (`nSavedChans`).
    pub fn n_saved_chans(&self) -> Result<usize> {
        let n: usize = self.require("nSavedChans")?;
        if n == 0 {
            return Err(Error::NoChannels);
        }
        Ok(n)
    }

    /// Size of the binary file in bytes (`fileSizeBytes`).
    pub fn file_size_bytes(&self) -> Result<usize> {
        self.require("fileSizeBytes")
    }

    /// Whole samples in the file: `(fileSizeBytes / 2) / nSavedChans`.
    ///
    /// A trailing partial sample is dropped.
    pub fn n_samples(&self) -> Result<usize> {
        let n_chan = self.n_saved_chans()?;
        let n_byte = self.file_size_bytes()?;
        let n_sample = (n_byte / 2) / n_chan;
        let stride = 2 * n_chan;
        if n_byte % stride != 0 {
            log::debug!(
                "fileSizeBytes {n_byte} is not a multiple of {stride}; \
                 dropping {} trailing bytes",
                n_byte - n_sample * stride
            );
        }
        Ok(n_sample)
    }

    /// Sampling rate in Hz (`imSampRate` for imec streams, `niSampRate` for
    /// NI-DAQ streams), if recorded.
    pub fn sample_rate(&self) -> Option<f64> {
        ["imSampRate", "niSampRate"]
            .iter()
            .find_map(|key| self.get(key)?.parse().ok())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Companion `.meta` path of a SpikeGLX `.bin` file.
///
/// `run_g0_t0.imec0.lf.bin` → `run_g0_t0.imec0.lf.meta`
pub fn meta_path_for(bin: impl AsRef<Path>) -> PathBuf {
    bin.as_ref().with_extension("meta")
}
