use serde::{Deserialize, Serialize};

/// One primary vertex as stored on disk.
///
/// Polarization is a fixed-size field here even though it is optional in
/// the event model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawVertex {
    /// Particle name.
    pub particle_name: String,
    /// Position in mm.
    pub pos: [f64; 3],
    /// Direction.
    pub dir: [f64; 3],
    /// Polarization; the zero vector for unpolarized vertices.
    pub pol: [f64; 3],
    /// Kinetic energy in MeV.
    pub ke: f64,
    /// Start time in ns.
    pub t0: f64,
    /// Track id.
    pub trackid: i32,
    /// PDG code.
    pub pdgcode: i32,
}

/// Dense photon block: flat columns, vectors interleaved as `x0 y0 z0 x1 ...`.
///
/// The block's size is the length of `wavelengths`; a zero-size block
/// stands for an absent bundle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPhotons {
    /// Positions, 3 entries per photon.
    pub pos: Vec<f32>,
    /// Directions, 3 entries per photon.
    pub dir: Vec<f32>,
    /// Polarizations, 3 entries per photon.
    pub pol: Vec<f32>,
    /// Wavelengths in nm.
    pub wavelengths: Vec<f32>,
    /// Times in ns.
    pub t: Vec<f32>,
    /// Last hit triangle ids.
    pub last_hit_triangles: Vec<i32>,
    /// Status flags.
    pub flags: Vec<u32>,
}

impl RawPhotons {
    /// Declared number of photons in the block.
    pub fn size(&self) -> usize {
        self.wavelengths.len()
    }

    /// Empties every column while keeping allocations.
    pub fn clear(&mut self) {
        self.pos.clear();
        self.dir.clear();
        self.pol.clear();
        self.wavelengths.clear();
        self.t.clear();
        self.last_hit_triangles.clear();
        self.flags.clear();
    }
}

/// Sparse entry for a channel that registered a hit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawChannel {
    /// Channel index.
    pub id: u32,
    /// Hit time in ns.
    pub t: f32,
    /// Integrated charge.
    pub q: f32,
    /// Status flags.
    pub flags: u32,
}

/// Complete per-event record.
///
/// `nchannels` is the detector's total channel count and is the only field
/// that tells "no channel data" (`0`) from "channels present, none hit".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event id.
    pub id: u64,
    /// Primary vertices in causal order.
    pub vertices: Vec<RawVertex>,
    /// Photons at the start of propagation.
    pub photons_beg: RawPhotons,
    /// Photons at detection or exit.
    pub photons_end: RawPhotons,
    /// Number of hit channels, equal to `channels.len()`.
    pub nhit: u32,
    /// Total number of channels in the detector.
    pub nchannels: u32,
    /// Hit channels only.
    pub channels: Vec<RawChannel>,
}
