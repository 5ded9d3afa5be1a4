//! Deterministic stand-in for a full transport engine.
//!
//! The toy engine moves the primary along a straight track whose length
//! grows with kinetic energy. Above the Cherenkov threshold it emits photons
//! on the Cherenkov cone; with a `LIGHT_YIELD` and scintillation enabled it
//! adds isotropic scintillation photons. Every shot draws from its own RNG
//! substream and the recorded photons are shuffled, so emission order is
//! arbitrary while the photon set is reproducible.

use chroma_core::{ChromaError, ErrorInfo, RngHandle};
use nalgebra::Vector3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;

use crate::config::ToyEngineConfig;
use crate::engine::{
    ParticleTable, PhotonHarvest, PrimaryConfig, TransportEngine, WorldSpec,
};
use crate::material::{energy_to_wavelength, MaterialPropertiesTable, PropertyVector};

/// Speed of light in mm/ns.
const C_LIGHT_MM_NS: f64 = 299.792_458;

/// Rest masses in MeV of the particles the toy engine knows about.
const PARTICLES: [(&str, f64); 11] = [
    ("e-", 0.510_998_95),
    ("e+", 0.510_998_95),
    ("mu-", 105.658_375_5),
    ("mu+", 105.658_375_5),
    ("pi-", 139.570_39),
    ("pi+", 139.570_39),
    ("proton", 938.272_088),
    ("neutron", 939.565_420),
    ("alpha", 3_727.379_4),
    ("gamma", 0.0),
    ("opticalphoton", 0.0),
];

/// Track id assigned to the primary of every shot.
const PRIMARY_TRACK_ID: i32 = 1;

/// Deterministic toy implementation of [`TransportEngine`].
#[derive(Debug, Clone)]
pub struct ToyEngine {
    seed: u64,
    config: ToyEngineConfig,
    world: Option<WorldSpec>,
    table: Option<MaterialPropertiesTable>,
    scintillation: bool,
    primary: Option<PrimaryConfig>,
    shots: u64,
    harvest: PhotonHarvest,
}

impl ToyEngine {
    /// Creates an uninitialised engine drawing from `seed`.
    pub fn new(seed: u64, config: ToyEngineConfig) -> Self {
        Self {
            seed,
            config,
            world: None,
            table: None,
            scintillation: true,
            primary: None,
            shots: 0,
            harvest: PhotonHarvest::default(),
        }
    }

    /// Number of shots fired so far, warm-up included.
    pub fn shots_fired(&self) -> u64 {
        self.shots
    }

    fn engine_error(code: &str, message: &str) -> ChromaError {
        ChromaError::Engine(ErrorInfo::new(code, message).with_context("engine", "toy"))
    }

    fn emit_cherenkov(
        &mut self,
        rng: &mut RngHandle,
        primary: &PrimaryConfig,
        track_length: f64,
        beta: f64,
        rindex: &PropertyVector,
    ) {
        let (e_min, e_max) = match (rindex.energies.first(), rindex.energies.last()) {
            (Some(lo), Some(hi)) => (*lo, *hi),
            _ => return,
        };
        let n_max = rindex.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if beta * n_max <= 1.0 {
            return;
        }
        let count =
            (primary.kinetic_energy() * self.config.cherenkov_yield_per_mev).round() as usize;
        let count = count.min(self.config.max_photons_per_shot);
        let d = Vector3::from(primary.direction);
        let (u, v) = orthonormal_basis(&d);
        let start = Vector3::from(primary.position);
        for _ in 0..count {
            let s = rng.uniform_in(0.0, track_length);
            let phi = rng.azimuth();
            let energy = rng.uniform_in(e_min, e_max);
            // Dispersion: threshold and cone angle follow n at this energy.
            let n = match rindex.value_at(energy) {
                Some(n) if beta * n > 1.0 => n,
                _ => continue,
            };
            let cos_theta = 1.0 / (beta * n);
            let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
            let k = d * cos_theta + (u * phi.cos() + v * phi.sin()) * sin_theta;
            // In the plane of track and photon, perpendicular to the photon.
            let pol = (d - k * d.dot(&k)).try_normalize(1e-12).unwrap_or(u);
            self.harvest.push(
                (start + d * s).into(),
                k.into(),
                pol.into(),
                energy_to_wavelength(energy),
                primary.time + s / (beta * C_LIGHT_MM_NS),
                PRIMARY_TRACK_ID,
            );
        }
    }

    fn emit_scintillation(
        &mut self,
        rng: &mut RngHandle,
        primary: &PrimaryConfig,
        track_length: f64,
        beta: f64,
        table: &MaterialPropertiesTable,
    ) {
        let light_yield = match table.const_property("LIGHT_YIELD") {
            Some(y) if self.scintillation => y,
            _ => return,
        };
        let count = (primary.kinetic_energy() * light_yield).round() as usize;
        let remaining = self
            .config
            .max_photons_per_shot
            .saturating_sub(self.harvest.len());
        let count = count.min(remaining);
        let spectrum = table
            .property("SCINTILLATION")
            .or_else(|| table.property("RINDEX"))
            .and_then(|curve| Some((curve, WeightedIndex::new(&curve.values).ok()?)));
        let waveform = table
            .property("SCINTWAVEFORM")
            .and_then(|curve| Some((curve, WeightedIndex::new(&curve.values).ok()?)));
        let start = Vector3::from(primary.position);
        let d = Vector3::from(primary.direction);
        for _ in 0..count {
            let s = rng.uniform_in(0.0, track_length);
            let dir = Vector3::from(rng.isotropic_direction());
            let (u, _) = orthonormal_basis(&dir);
            let energy = match &spectrum {
                Some((curve, weights)) => curve.energies[weights.sample(rng)],
                None => continue,
            };
            let delay = match &waveform {
                Some((curve, weights)) => curve.energies[weights.sample(rng)],
                None => 0.0,
            };
            self.harvest.push(
                (start + d * s).into(),
                dir.into(),
                u.into(),
                energy_to_wavelength(energy),
                primary.time + s / (beta.max(1e-9) * C_LIGHT_MM_NS) + delay,
                PRIMARY_TRACK_ID,
            );
        }
    }

    fn shuffle_harvest(&mut self, rng: &mut RngHandle) {
        let mut order: Vec<usize> = (0..self.harvest.len()).collect();
        order.shuffle(rng);
        let old = std::mem::take(&mut self.harvest);
        for i in order {
            self.harvest.push(
                [old.x[i], old.y[i], old.z[i]],
                [old.dir_x[i], old.dir_y[i], old.dir_z[i]],
                [old.pol_x[i], old.pol_y[i], old.pol_z[i]],
                old.wavelength[i],
                old.t0[i],
                old.parent_track_id[i],
            );
        }
    }
}

impl ParticleTable for ToyEngine {
    fn mass_of(&self, particle_name: &str) -> Result<f64, ChromaError> {
        PARTICLES
            .iter()
            .find(|(name, _)| *name == particle_name)
            .map(|(_, mass)| *mass)
            .ok_or_else(|| {
                ChromaError::Particle(
                    ErrorInfo::new("unknown-particle", "particle not in the particle table")
                        .with_context("particle", particle_name),
                )
            })
    }
}

impl TransportEngine for ToyEngine {
    fn initialize(
        &mut self,
        world: &WorldSpec,
        table: &MaterialPropertiesTable,
    ) -> Result<(), ChromaError> {
        if self.world.is_some() {
            return Err(Self::engine_error(
                "already-initialized",
                "engine initialised twice",
            ));
        }
        if !(world.size_mm > 0.0 && world.size_mm.is_finite()) {
            return Err(Self::engine_error("world-size", "world size must be positive"));
        }
        if table.property("RINDEX").map_or(true, |p| p.values.is_empty()) {
            return Err(Self::engine_error("missing-rindex", "material has no RINDEX"));
        }
        self.world = Some(world.clone());
        self.table = Some(table.clone());
        Ok(())
    }

    fn set_scintillation(&mut self, enabled: bool) {
        self.scintillation = enabled;
    }

    fn configure_primary(&mut self, primary: &PrimaryConfig) -> Result<(), ChromaError> {
        self.mass_of(&primary.particle_name)?;
        self.primary = Some(primary.clone());
        Ok(())
    }

    fn reset_tracking(&mut self) {
        self.harvest.clear();
    }

    fn fire_one(&mut self) -> Result<(), ChromaError> {
        let (world, table) = match (&self.world, &self.table) {
            (Some(world), Some(table)) => (world.clone(), table.clone()),
            _ => return Err(Self::engine_error("not-initialized", "engine not initialised")),
        };
        let primary = self
            .primary
            .clone()
            .ok_or_else(|| Self::engine_error("no-primary", "particle gun not configured"))?;
        if !world.contains(primary.position) {
            return Err(Self::engine_error(
                "primary-outside-world",
                "primary vertex lies outside the world volume",
            ));
        }
        let mut rng = RngHandle::for_substream(self.seed, self.shots);
        self.shots += 1;

        let beta = if primary.mass > 0.0 {
            let gamma = primary.energy / primary.mass;
            (1.0 - 1.0 / (gamma * gamma)).max(0.0).sqrt()
        } else {
            1.0
        };
        let track_length = track_length_in_world(
            &world,
            primary.position,
            primary.direction,
            primary.kinetic_energy().max(0.0) * self.config.track_length_per_mev,
        );
        if let Some(rindex) = table.property("RINDEX") {
            self.emit_cherenkov(&mut rng, &primary, track_length, beta, rindex);
        }
        self.emit_scintillation(&mut rng, &primary, track_length, beta, &table);
        self.shuffle_harvest(&mut rng);
        Ok(())
    }

    fn extract_secondary_photons(&mut self) -> PhotonHarvest {
        std::mem::take(&mut self.harvest)
    }
}

/// Clips a straight track so it ends inside the world cube.
fn track_length_in_world(world: &WorldSpec, start: [f64; 3], dir: [f64; 3], length: f64) -> f64 {
    let half = 0.5 * world.size_mm;
    let mut limit = length;
    for axis in 0..3 {
        if dir[axis] > 0.0 {
            limit = limit.min((half - start[axis]) / dir[axis]);
        } else if dir[axis] < 0.0 {
            limit = limit.min((-half - start[axis]) / dir[axis]);
        }
    }
    limit.max(0.0)
}

fn orthonormal_basis(d: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let helper = if d.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = d.cross(&helper).try_normalize(1e-12).unwrap_or_else(Vector3::z);
    let v = d.cross(&u);
    (u, v)
}
