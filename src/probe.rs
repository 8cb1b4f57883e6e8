//! Probe geometry: which raw channel belongs to which shank.
//!
//! The Neuropixels 2.0 four-shank LF stream interleaves shanks channel by
//! channel:
//!
//! ```text
//! raw channel:  0  1  2  3  4  5  6  7  8 …
//! shank:        0  1  2  3  0  1  2  3  0 …
//! local index:  0  0  0  0  1  1  1  1  2 …
//! ```
//!
//! so `raw = local * n_shanks + shank`.  Adjacent shanks of a pair sit half
//! an electrode pitch apart along depth, which is what lets their CSD be
//! merged onto a grid of twice the density (see [`SHANK_PAIRS`]).

use crate::error::{Error, Result};

/// Shanks on a Neuropixels 2.0 multi-shank probe.
pub const NEUROPIXELS_SHANKS: usize = 4;

/// Shank pairs whose CSD is summed into one merged column, in output order.
pub const SHANK_PAIRS: [(usize, usize); 2] = [(0, 1), (2, 3)];

/// Location of a raw channel on the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub shank: usize,
    /// Index along the shank, shallow to deep in recording order.
    pub local: usize,
}

/// Interleaved raw-channel → (shank, local channel) mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShankMap {
    n_shanks: usize,
}

impl ShankMap {
    /// Interleaved mapping over `n_shanks` shanks.
    pub fn interleaved(n_shanks: usize) -> Result<Self> {
        if n_shanks == 0 {
            return Err(Error::InvalidParameter {
                name: "n_shanks",
                value: 0.0,
                reason: "a probe has at least one shank",
            });
        }
        Ok(Self { n_shanks })
    }

    /// The four-shank Neuropixels layout.
    pub fn neuropixels() -> Self {
        Self { n_shanks: NEUROPIXELS_SHANKS }
    }

    #[inline]
    pub fn n_shanks(&self) -> usize {
        self.n_shanks
    }

    #[inline]
    pub fn site(&self, raw: usize) -> Site {
        Site { shank: raw % self.n_shanks, local: raw / self.n_shanks }
    }

    #[inline]
    pub fn raw_index(&self, site: Site) -> usize {
        site.local * self.n_shanks + site.shank
    }

    /// Raw channel indices of `shank`, in local order, for a recording with
    /// `n_raw` channels.
    pub fn shank_channels(&self, shank: usize, n_raw: usize) -> Vec<usize> {
        (shank..n_raw).step_by(self.n_shanks).collect()
    }

    /// Channels per shank, or `None` if `n_raw` does not split evenly.
    pub fn channels_per_shank(&self, n_raw: usize) -> Option<usize> {
        (n_raw % self.n_shanks == 0).then(|| n_raw / self.n_shanks)
    }
}

impl Default for ShankMap {
    fn default() -> Self {
        Self::neuropixels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_and_raw_index_round_trip() {
        let map = ShankMap::neuropixels();
        for raw in 0..384 {
            assert_eq!(map.raw_index(map.site(raw)), raw);
        }
        assert_eq!(map.site(6), Site { shank: 2, local: 1 });
    }

    #[test]
    fn shank_channels_are_stride_four() {
        let map = ShankMap::neuropixels();
        assert_eq!(map.shank_channels(0, 12), vec![0, 4, 8]);
        assert_eq!(map.shank_channels(3, 12), vec![3, 7, 11]);
    }

    #[test]
    fn every_channel_assigned_once() {
        let map = ShankMap::neuropixels();
        let mut seen = vec![0; 16];
        for shank in 0..map.n_shanks() {
            for raw in map.shank_channels(shank, 16) {
                assert_eq!(map.site(raw).shank, shank);
                seen[raw] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn uneven_split_detected() {
        let map = ShankMap::neuropixels();
        assert_eq!(map.channels_per_shank(384), Some(96));
        assert_eq!(map.channels_per_shank(10), None);
    }

    #[test]
    fn zero_shanks_rejected() {
        let err = ShankMap::interleaved(0).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "n_shanks", .. }));
        assert!(err.is_config());
        let two = ShankMap::interleaved(2).unwrap();
        assert_eq!(two.shank_channels(1, 6), vec![1, 3, 5]);
    }

    #[test]
    fn pairs_cover_all_shanks() {
        let mut shanks: Vec<usize> = SHANK_PAIRS.iter().flat_map(|&(a, b)| [a, b]).collect();
        shanks.sort_unstable();
        assert_eq!(shanks, (0..NEUROPIXELS_SHANKS).collect::<Vec<_>>());
    }
}
