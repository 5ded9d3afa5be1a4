use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Initial kinematic state of a primary particle.
///
/// Units follow the transport engine conventions: millimetres, nanoseconds
/// and MeV. The direction does not need to be normalised; the generator
/// normalises it before handing it to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Particle name as understood by the engine's particle table (`e-`, `mu+`, ...).
    pub particle_name: String,
    /// Starting position in mm.
    pub pos: [f64; 3],
    /// Momentum direction.
    pub dir: [f64; 3],
    /// Kinetic energy in MeV.
    pub ke: f64,
    /// Start time in ns.
    #[serde(default)]
    pub t0: f64,
    /// Optional polarization; the engine default applies when absent.
    #[serde(default)]
    pub pol: Option<[f64; 3]>,
    /// Track identifier assigned by the producer; -1 when unassigned.
    #[serde(default = "unassigned_track")]
    pub trackid: i32,
    /// PDG particle code.
    #[serde(default)]
    pub pdgcode: i32,
}

fn unassigned_track() -> i32 {
    -1
}

impl Vertex {
    /// Creates a vertex without polarization, track id or PDG code.
    pub fn new(
        particle_name: impl Into<String>,
        pos: [f64; 3],
        dir: [f64; 3],
        ke: f64,
        t0: f64,
    ) -> Self {
        Self {
            particle_name: particle_name.into(),
            pos,
            dir,
            ke,
            t0,
            pol: None,
            trackid: -1,
            pdgcode: 0,
        }
    }

    /// Returns a copy of the vertex with the given polarization.
    pub fn with_pol(mut self, pol: [f64; 3]) -> Self {
        self.pol = Some(pol);
        self
    }

    /// Returns a copy of the vertex with the given track id and PDG code.
    pub fn with_ids(mut self, trackid: i32, pdgcode: i32) -> Self {
        self.trackid = trackid;
        self.pdgcode = pdgcode;
        self
    }
}

/// Returns `v / |v|`, or `None` for a zero or non-finite vector.
pub fn unit(v: [f64; 3]) -> Option<[f64; 3]> {
    Vector3::from(v)
        .try_normalize(0.0)
        .filter(|u| u.iter().all(|c| c.is_finite()))
        .map(Into::into)
}
