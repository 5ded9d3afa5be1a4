#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chroma_core::{ChromaError, ErrorInfo};
use chroma_gen::{
    Material, MaterialPropertiesTable, ParticleTable, PhotonHarvest, PrimaryConfig,
    TransportEngine, WorldSpec,
};

static ENGINE_LOCK: Mutex<()> = Mutex::new(());

/// Serialises tests that construct a generator: only one may own the run manager.
pub fn engine_lock() -> MutexGuard<'static, ()> {
    ENGINE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn water() -> Material {
    Material {
        name: "water".into(),
        density: 1.0,
        composition: BTreeMap::from([("H".to_string(), 0.11), ("O".to_string(), 0.89)]),
        refractive_index: vec![[200.0, 1.40], [400.0, 1.35], [800.0, 1.33]],
        scintillation_light_yield: None,
        scintillation_spectrum: None,
        scintillation_waveform: None,
        scintillation_mod: None,
    }
}

/// Engine whose photons depend only on the configured primary and whose
/// emission order rotates from shot to shot.
#[derive(Debug, Default)]
pub struct StubEngine {
    pub calls: Vec<&'static str>,
    pub primaries: Vec<PrimaryConfig>,
    pub shots: usize,
    pub fail_init: bool,
    pub table: Option<MaterialPropertiesTable>,
    pending: PhotonHarvest,
}

impl StubEngine {
    pub fn failing() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    /// Photons the stub emits for a primary, in canonical (unrotated) order.
    pub fn photons_for(primary: &PrimaryConfig, rotation: usize) -> PhotonHarvest {
        let x = primary.position[0];
        let mut rows: Vec<([f64; 3], [f64; 3])> = vec![
            ([x, 0.0, 0.0], [0.6, 0.0, 0.8]),
            ([x, 1.0, 0.0], [-0.8, 0.6, 0.0]),
            ([x, 2.0, 0.0], [0.0, -1.0, 0.0]),
            ([x, 3.0, 0.0], [0.0, 0.6, -0.8]),
        ];
        if x < 0.0 {
            rows.truncate(2);
        }
        let len = rows.len();
        rows.rotate_left(rotation % len);
        let mut harvest = PhotonHarvest::default();
        for (pos, dir) in rows {
            harvest.push(pos, dir, [0.0, 0.0, 1.0], 420.0 + pos[1], primary.time + pos[1], 1);
        }
        harvest
    }
}

impl ParticleTable for StubEngine {
    fn mass_of(&self, particle_name: &str) -> Result<f64, ChromaError> {
        match particle_name {
            "e-" => Ok(0.511),
            "mu-" => Ok(105.66),
            other => Err(ChromaError::Particle(
                ErrorInfo::new("unknown-particle", "not in stub table").with_context("particle", other),
            )),
        }
    }
}

impl TransportEngine for StubEngine {
    fn initialize(
        &mut self,
        _world: &WorldSpec,
        table: &MaterialPropertiesTable,
    ) -> Result<(), ChromaError> {
        self.calls.push("initialize");
        if self.fail_init {
            return Err(ChromaError::Engine(ErrorInfo::new("stub-init", "refusing to start")));
        }
        self.table = Some(table.clone());
        Ok(())
    }

    fn set_scintillation(&mut self, _enabled: bool) {}

    fn configure_primary(&mut self, primary: &PrimaryConfig) -> Result<(), ChromaError> {
        self.calls.push("configure");
        self.primaries.push(primary.clone());
        Ok(())
    }

    fn reset_tracking(&mut self) {
        self.calls.push("reset");
        self.pending.clear();
    }

    fn fire_one(&mut self) -> Result<(), ChromaError> {
        self.calls.push("fire");
        let primary = self.primaries.last().cloned().expect("configured");
        let harvest = Self::photons_for(&primary, self.shots);
        self.shots += 1;
        for i in 0..harvest.len() {
            self.pending.push(
                [harvest.x[i], harvest.y[i], harvest.z[i]],
                [harvest.dir_x[i], harvest.dir_y[i], harvest.dir_z[i]],
                [harvest.pol_x[i], harvest.pol_y[i], harvest.pol_z[i]],
                harvest.wavelength[i],
                harvest.t0[i],
                harvest.parent_track_id[i],
            );
        }
        Ok(())
    }

    fn extract_secondary_photons(&mut self) -> PhotonHarvest {
        self.calls.push("extract");
        std::mem::take(&mut self.pending)
    }
}
