//! Memory-mapped SpikeGLX binary recording.
//!
//! The `.bin` file is a dense `[n_samples, n_channels]` array of
//! little-endian `i16`, sample-major.  [`RawRecording::view`] reinterprets
//! the mapped bytes in place; nothing is copied until a caller asks for a
//! window with [`RawRecording::read_slice`].
//!
//! The mapping is released when the recording is dropped (or explicitly
//! with [`RawRecording::close`]).
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use ndarray::{s, Array2, ArrayView2};

use super::meta::{meta_path_for, Meta};
use crate::error::{Error, Result};

#[cfg(target_endian = "big")]
compile_error!("SpikeGLX samples are little-endian; big-endian hosts are not supported");

/// A read-only, memory-mapped recording.
#[derive(Debug)]
pub struct RawRecording {
    meta: Meta,
    path: PathBuf,
    mmap: Mmap,
    n_samples: usize,
    n_channels: usize,
}

impl RawRecording {
    /// Open `bin`, reading metadata from the companion `.meta` file.
    pub fn open(bin: impl AsRef<Path>) -> Result<Self> {
        let bin = bin.as_ref();
        let meta = Meta::from_path(meta_path_for(bin))?;
        Self::open_with_meta(bin, meta)
    }

    /// Open `bin` with metadata obtained elsewhere.
    pub fn open_with_meta(bin: impl AsRef<Path>, meta: Meta) -> Result<Self> {
        let path = bin.as_ref().to_path_buf();
        let n_channels = meta.n_saved_chans()?;
        let n_samples = meta.n_samples()?;

        let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
        // SAFETY: the map is read-only and lives no longer than `self`;
        // SpikeGLX does not rewrite finished recordings.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(&path, e))?;

        let needed = n_samples * n_channels * 2;
        if mmap.len() < needed {
            return Err(Error::FileTooShort { path, expected: needed, actual: mmap.len() });
        }

        log::info!(
            "opened {}: {n_samples} samples x {n_channels} ch ({} bytes mapped)",
            path.display(),
            mmap.len()
        );
        Ok(Self { meta, path, mmap, n_samples, n_channels })
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    #[inline]
    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sampling rate from the metadata, if recorded.
    pub fn sample_rate(&self) -> Option<f64> {
        self.meta.sample_rate()
    }

    /// Zero-copy `[n_samples, n_channels]` view of the samples.
    pub fn view(&self) -> Result<ArrayView2<'_, i16>> {
        let n_bytes = self.n_samples * self.n_channels * 2;
        let samples: &[i16] =
            bytemuck::try_cast_slice(&self.mmap[..n_bytes]).map_err(Error::SampleCast)?;
        ArrayView2::from_shape((self.n_samples, self.n_channels), samples).map_err(|_| Error::Shape {
            expected: vec![self.n_samples, self.n_channels],
            actual: vec![samples.len()],
        })
    }

    /// Copy samples `[start, end)` of every channel into a `[end - start, C]`
    /// `f64` array.
    pub fn read_slice(&self, start: usize, end: usize) -> Result<Array2<f64>> {
        if start > end || end > self.n_samples {
            return Err(Error::SampleRange { start, end, n_samples: self.n_samples });
        }
        Ok(self.view()?.slice(s![start..end, ..]).mapv(f64::from))
    }

    /// Unmap the file.
    pub fn close(self) {
        log::debug!("closing {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_recording(dir: &Path, n_samples: usize, n_channels: usize, extra: &[u8]) -> PathBuf {
        let bin = dir.join("test_g0_t0.imec0.lf.bin");
        let mut f = File::create(&bin).unwrap();
        for t in 0..n_samples {
            for c in 0..n_channels {
                f.write_all(&((t * 10 + c) as i16).to_le_bytes()).unwrap();
            }
        }
        f.write_all(extra).unwrap();
        let size = n_samples * n_channels * 2 + extra.len();
        std::fs::write(
            meta_path_for(&bin),
            format!("nSavedChans={n_channels}\nfileSizeBytes={size}\nimSampRate=2500\n"),
        )
        .unwrap();
        bin
    }

    #[test]
    fn view_matches_written_samples() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write_recording(dir.path(), 20, 8, &[]);
        let raw = RawRecording::open(&bin).unwrap();
        assert_eq!((raw.n_samples(), raw.n_channels()), (20, 8));
        assert_eq!(raw.sample_rate(), Some(2500.0));
        let v = raw.view().unwrap();
        assert_eq!(v[[3, 5]], 35);
        assert_eq!(v[[19, 7]], 197);
    }

    #[test]
    fn trailing_partial_sample_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write_recording(dir.path(), 10, 4, &[1, 2, 3]);
        let raw = RawRecording::open(&bin).unwrap();
        assert_eq!(raw.n_samples(), 10);
        assert_eq!(raw.view().unwrap().dim(), (10, 4));
    }

    #[test]
    fn read_slice_copies_window() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write_recording(dir.path(), 12, 4, &[]);
        let raw = RawRecording::open(&bin).unwrap();
        let w = raw.read_slice(2, 5).unwrap();
        assert_eq!(w.dim(), (3, 4));
        assert_eq!(w[[0, 1]], 21.0);
        assert!(matches!(raw.read_slice(5, 13), Err(Error::SampleRange { .. })));
        raw.close();
    }

    #[test]
    fn missing_meta_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("nothing.bin");
        std::fs::write(&bin, [0u8; 16]).unwrap();
        assert!(matches!(RawRecording::open(&bin), Err(Error::Io { .. })));
    }

    #[test]
    fn file_shorter_than_meta_claims() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("short.bin");
        std::fs::write(&bin, [0u8; 16]).unwrap();
        let meta = Meta::parse("nSavedChans=4\nfileSizeBytes=64\n").unwrap();
        assert!(matches!(
            RawRecording::open_with_meta(&bin, meta),
            Err(Error::FileTooShort { expected: 64, actual: 16, .. })
        ));
    }
}
