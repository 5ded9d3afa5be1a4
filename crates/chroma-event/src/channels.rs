use chroma_core::{ChromaError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Dense per-channel readout for one event.
///
/// Every channel of the detector has an entry whether or not it registered
/// a hit; `hit` is the discriminator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Channels {
    /// Whether each channel registered a hit.
    pub hit: Vec<bool>,
    /// Hit time in ns.
    pub t: Vec<f32>,
    /// Integrated charge.
    pub q: Vec<f32>,
    /// Per-channel status bitfield.
    pub flags: Vec<u32>,
}

impl Channels {
    /// Creates a channel set, checking that all columns have the same length.
    pub fn new(
        hit: Vec<bool>,
        t: Vec<f32>,
        q: Vec<f32>,
        flags: Vec<u32>,
    ) -> Result<Self, ChromaError> {
        let channels = Self { hit, t, q, flags };
        channels.validate()?;
        Ok(channels)
    }

    /// Checks that every column has one entry per channel.
    pub fn validate(&self) -> Result<(), ChromaError> {
        let n = self.hit.len();
        for (name, len) in [
            ("t", self.t.len()),
            ("q", self.q.len()),
            ("flags", self.flags.len()),
        ] {
            if len != n {
                return Err(ChromaError::Schema(
                    ErrorInfo::new("channel-column-length", "channel columns differ in length")
                        .with_context("column", name)
                        .with_context("expected", n.to_string())
                        .with_context("actual", len.to_string()),
                ));
            }
        }
        Ok(())
    }

    /// Creates `n` channels none of which registered a hit.
    pub fn unhit(n: usize) -> Self {
        Self {
            hit: vec![false; n],
            t: vec![0.0; n],
            q: vec![0.0; n],
            flags: vec![0; n],
        }
    }

    /// Total number of channels.
    pub fn len(&self) -> usize {
        self.hit.len()
    }

    /// Returns `true` when the set describes no channels at all.
    pub fn is_empty(&self) -> bool {
        self.hit.is_empty()
    }

    /// Number of channels that registered a hit.
    pub fn hit_count(&self) -> usize {
        self.hit.iter().filter(|&&h| h).count()
    }

    /// Returns the ids, times and charges of hit channels only.
    pub fn hit_channels(&self) -> (Vec<u32>, Vec<f32>, Vec<f32>) {
        let mut ids = Vec::new();
        let mut t = Vec::new();
        let mut q = Vec::new();
        for (id, _) in self.hit.iter().enumerate().filter(|(_, &h)| h) {
            ids.push(id as u32);
            t.push(self.t[id]);
            q.push(self.q[id]);
        }
        (ids, t, q)
    }
}
