use std::sync::atomic::{AtomicBool, Ordering};

use chroma_core::{ChromaError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::material::MaterialPropertiesTable;

/// Resolves particle rest masses by name.
pub trait ParticleTable {
    /// Returns the rest mass in MeV, or a `Particle` error for unknown names.
    fn mass_of(&self, particle_name: &str) -> Result<f64, ChromaError>;
}

/// World volume the primaries are fired into: an axis-aligned cube centred
/// on the origin and filled with a single material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSpec {
    /// Full edge length of the cube in mm.
    pub size_mm: f64,
    /// Name of the filling material.
    pub material: String,
}

impl WorldSpec {
    /// Creates a cubic world of the given edge length.
    pub fn cube(size_mm: f64, material: impl Into<String>) -> Self {
        Self {
            size_mm,
            material: material.into(),
        }
    }

    /// Returns `true` when `pos` lies inside the world volume.
    pub fn contains(&self, pos: [f64; 3]) -> bool {
        let half = 0.5 * self.size_mm;
        pos.iter().all(|c| c.abs() <= half)
    }
}

/// Particle gun configuration for a single shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryConfig {
    /// Particle name.
    pub particle_name: String,
    /// Total energy (kinetic plus rest mass) in MeV.
    pub energy: f64,
    /// Rest mass in MeV, as resolved from the particle table.
    pub mass: f64,
    /// Position in mm.
    pub position: [f64; 3],
    /// Unit momentum direction.
    pub direction: [f64; 3],
    /// Start time in ns.
    pub time: f64,
    /// Unit polarization; `None` keeps the engine default.
    pub polarization: Option<[f64; 3]>,
}

impl PrimaryConfig {
    /// Kinetic energy in MeV.
    pub fn kinetic_energy(&self) -> f64 {
        self.energy - self.mass
    }
}

/// Optical photons recorded during one shot, column by column.
///
/// Positions are in mm, times in ns and wavelengths in nm. Every column
/// has one entry per photon.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhotonHarvest {
    /// Position x.
    pub x: Vec<f64>,
    /// Position y.
    pub y: Vec<f64>,
    /// Position z.
    pub z: Vec<f64>,
    /// Direction x.
    pub dir_x: Vec<f64>,
    /// Direction y.
    pub dir_y: Vec<f64>,
    /// Direction z.
    pub dir_z: Vec<f64>,
    /// Polarization x.
    pub pol_x: Vec<f64>,
    /// Polarization y.
    pub pol_y: Vec<f64>,
    /// Polarization z.
    pub pol_z: Vec<f64>,
    /// Wavelength in nm.
    pub wavelength: Vec<f64>,
    /// Creation time in ns.
    pub t0: Vec<f64>,
    /// Track id of the particle that emitted the photon.
    pub parent_track_id: Vec<i32>,
}

impl PhotonHarvest {
    /// Number of recorded photons.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns `true` when no photons were recorded.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Records one photon.
    pub fn push(
        &mut self,
        pos: [f64; 3],
        dir: [f64; 3],
        pol: [f64; 3],
        wavelength: f64,
        t0: f64,
        parent_track_id: i32,
    ) {
        self.x.push(pos[0]);
        self.y.push(pos[1]);
        self.z.push(pos[2]);
        self.dir_x.push(dir[0]);
        self.dir_y.push(dir[1]);
        self.dir_z.push(dir[2]);
        self.pol_x.push(pol[0]);
        self.pol_y.push(pol[1]);
        self.pol_z.push(pol[2]);
        self.wavelength.push(wavelength);
        self.t0.push(t0);
        self.parent_track_id.push(parent_track_id);
    }

    /// Drops every recorded photon.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Checks that every column has one entry per photon.
    pub fn validate(&self) -> Result<(), ChromaError> {
        let n = self.x.len();
        let columns = [
            ("y", self.y.len()),
            ("z", self.z.len()),
            ("dir_x", self.dir_x.len()),
            ("dir_y", self.dir_y.len()),
            ("dir_z", self.dir_z.len()),
            ("pol_x", self.pol_x.len()),
            ("pol_y", self.pol_y.len()),
            ("pol_z", self.pol_z.len()),
            ("wavelength", self.wavelength.len()),
            ("t0", self.t0.len()),
            ("parent_track_id", self.parent_track_id.len()),
        ];
        match columns.iter().find(|(_, len)| *len != n) {
            Some((name, len)) => Err(ChromaError::Engine(
                ErrorInfo::new("harvest-column-length", "photon harvest columns differ in length")
                    .with_context("column", *name)
                    .with_context("expected", n.to_string())
                    .with_context("actual", len.to_string()),
            )),
            None => Ok(()),
        }
    }
}

/// Contract the generator needs from a particle-transport engine.
///
/// One call to [`fire_one`](TransportEngine::fire_one) transports a single
/// primary. Photons recorded since the last
/// [`reset_tracking`](TransportEngine::reset_tracking) are handed out by
/// [`extract_secondary_photons`](TransportEngine::extract_secondary_photons).
/// Optical properties are indexed by ascending photon energy.
pub trait TransportEngine: ParticleTable {
    /// Builds the world volume and loads the material. Called exactly once.
    fn initialize(
        &mut self,
        world: &WorldSpec,
        table: &MaterialPropertiesTable,
    ) -> Result<(), ChromaError>;

    /// Enables or disables scintillation light production.
    fn set_scintillation(&mut self, enabled: bool);

    /// Configures the particle gun for the next shot.
    fn configure_primary(&mut self, primary: &PrimaryConfig) -> Result<(), ChromaError>;

    /// Clears tracking and stepping state left over from previous shots.
    fn reset_tracking(&mut self);

    /// Transports one primary.
    fn fire_one(&mut self) -> Result<(), ChromaError>;

    /// Takes the optical photons produced since the last reset.
    fn extract_secondary_photons(&mut self) -> PhotonHarvest;
}

static RUN_MANAGER_HELD: AtomicBool = AtomicBool::new(false);

/// Exclusive claim on the process-wide transport run manager.
///
/// Transport engines keep their run manager in process-global state, so
/// only one generator may be alive per process. The claim is released when
/// the lease is dropped.
#[derive(Debug)]
pub struct RunManagerLease {
    _private: (),
}

impl RunManagerLease {
    /// Claims the run manager, failing if another lease is alive.
    pub fn acquire() -> Result<Self, ChromaError> {
        RUN_MANAGER_HELD
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                ChromaError::Engine(
                    ErrorInfo::new("run-manager-busy", "a generator already owns the run manager")
                        .with_hint("drop the existing generator or use a separate process"),
                )
            })?;
        Ok(Self { _private: () })
    }

    /// Returns `true` while some lease is alive in this process.
    pub fn is_held() -> bool {
        RUN_MANAGER_HELD.load(Ordering::Acquire)
    }
}

impl Drop for RunManagerLease {
    fn drop(&mut self) {
        RUN_MANAGER_HELD.store(false, Ordering::Release);
    }
}
