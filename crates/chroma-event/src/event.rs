use serde::{Deserialize, Serialize};

use crate::channels::Channels;
use crate::photons::Photons;
use crate::vertex::Vertex;

/// One simulated detector event.
///
/// `None` and a present-but-empty value are distinct: the file format only
/// keeps that distinction for channels (through the total channel count),
/// so a zero-length photon bundle written to disk reads back as `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier.
    pub id: u64,
    /// Primary vertices in causal order.
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    /// Photons entering the simulation window.
    #[serde(default)]
    pub photons_beg: Option<Photons>,
    /// Photons at detection or exit.
    #[serde(default)]
    pub photons_end: Option<Photons>,
    /// Channel readout.
    #[serde(default)]
    pub channels: Option<Channels>,
}

impl Event {
    /// Creates an empty event with the given id.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}
