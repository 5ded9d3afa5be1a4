use chroma_core::{ChromaError, ErrorInfo};
use chroma_event::vertex::unit;
use chroma_event::{Photons, Vertex};
use serde::{Deserialize, Serialize};

use crate::engine::{PhotonHarvest, PrimaryConfig, RunManagerLease, TransportEngine, WorldSpec};
use crate::material::{properties_table, Material, MaterialPropertiesTable};

/// Edge length of the default world cube: 100 m.
pub const DEFAULT_WORLD_SIZE_MM: f64 = 100_000.0;

/// Behaviour switches for [`PhotonGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Sort each shot's photons by direction before concatenation.
    pub sort_photons: bool,
    /// Produce scintillation light in addition to Cherenkov light.
    pub scintillation: bool,
    /// Edge length of the world cube in mm.
    pub world_size_mm: f64,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            sort_photons: true,
            scintillation: true,
            world_size_mm: DEFAULT_WORLD_SIZE_MM,
        }
    }
}

/// Turns primary vertices into optical photons by firing them one at a
/// time through a transport engine.
///
/// Construction claims the process-wide [`RunManagerLease`], loads the
/// material into the engine and runs one discarded warm-up shot.
#[derive(Debug)]
pub struct PhotonGenerator<E: TransportEngine> {
    engine: E,
    options: GeneratorOptions,
    table: MaterialPropertiesTable,
    _lease: RunManagerLease,
}

impl<E: TransportEngine> PhotonGenerator<E> {
    /// Initialises `engine` with a world filled with `material`.
    pub fn new(
        mut engine: E,
        material: &Material,
        options: GeneratorOptions,
    ) -> Result<Self, ChromaError> {
        let lease = RunManagerLease::acquire()?;
        let table = properties_table(material)?;
        let world = WorldSpec::cube(options.world_size_mm, material.name.clone());
        engine
            .initialize(&world, &table)
            .map_err(|err| init_failure(err, "initialize"))?;
        engine.set_scintillation(options.scintillation);

        let mut generator = Self {
            engine,
            options,
            table,
            _lease: lease,
        };
        generator
            .generate(&[warmup_vertex()])
            .map_err(|err| init_failure(err, "warm-up"))?;
        log::info!(
            "photon generator ready: material={} world={}mm sort={} scintillation={}",
            generator.table.name,
            generator.options.world_size_mm,
            generator.options.sort_photons,
            generator.options.scintillation
        );
        Ok(generator)
    }

    /// Generates the photons produced by each vertex, concatenated in vertex order.
    ///
    /// Any failure discards the photons of the vertices already processed.
    pub fn generate(&mut self, vertices: &[Vertex]) -> Result<Photons, ChromaError> {
        let mut photons = Photons::empty();
        for (index, vertex) in vertices.iter().enumerate() {
            let shot = self.shoot(vertex)?;
            log::debug!(
                "shot {index}: {} {:.3} MeV -> {} photons",
                vertex.particle_name,
                vertex.ke,
                shot.len()
            );
            photons.extend_from(&shot);
        }
        Ok(photons)
    }

    /// Resolves the particle gun configuration for `vertex`.
    pub fn primary_for(&self, vertex: &Vertex) -> Result<PrimaryConfig, ChromaError> {
        let mass = self.engine.mass_of(&vertex.particle_name)?;
        let direction = unit(vertex.dir).ok_or_else(|| {
            ChromaError::Particle(
                ErrorInfo::new("degenerate-direction", "vertex direction has zero length")
                    .with_context("particle", vertex.particle_name.clone()),
            )
        })?;
        // A zero polarization is what an unpolarized vertex reads back as.
        let polarization = vertex.pol.and_then(unit);
        Ok(PrimaryConfig {
            particle_name: vertex.particle_name.clone(),
            energy: vertex.ke + mass,
            mass,
            position: vertex.pos,
            direction,
            time: vertex.t0,
            polarization,
        })
    }

    fn shoot(&mut self, vertex: &Vertex) -> Result<Photons, ChromaError> {
        let primary = self.primary_for(vertex)?;
        self.engine.configure_primary(&primary)?;
        self.engine.reset_tracking();
        self.engine.fire_one()?;
        let photons = harvest_to_photons(self.engine.extract_secondary_photons())?;
        if self.options.sort_photons {
            Ok(photons.sorted_by_direction())
        } else {
            Ok(photons)
        }
    }

    /// Options the generator was built with.
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Energy-indexed material table loaded into the engine.
    pub fn properties_table(&self) -> &MaterialPropertiesTable {
        &self.table
    }

    /// Shared access to the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

/// An electron at rest at the origin, starting at 1 ns.
fn warmup_vertex() -> Vertex {
    Vertex::new("e-", [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], 0.0, 1.0)
}

fn init_failure(err: ChromaError, stage: &str) -> ChromaError {
    let info = err.info().clone().with_context("stage", stage);
    match err {
        ChromaError::Engine(_) => ChromaError::Engine(info),
        other => ChromaError::Engine(
            ErrorInfo::new("engine-init", other.to_string()).with_context("stage", stage),
        ),
    }
}

/// Packs one shot's harvest into a freshly generated photon bundle.
pub fn harvest_to_photons(harvest: PhotonHarvest) -> Result<Photons, ChromaError> {
    harvest.validate()?;
    let n = harvest.len();
    let triple = |a: &[f64], b: &[f64], c: &[f64]| -> Vec<[f32; 3]> {
        (0..n)
            .map(|i| [a[i] as f32, b[i] as f32, c[i] as f32])
            .collect()
    };
    Photons::new(
        triple(&harvest.x, &harvest.y, &harvest.z),
        triple(&harvest.dir_x, &harvest.dir_y, &harvest.dir_z),
        triple(&harvest.pol_x, &harvest.pol_y, &harvest.pol_z),
        harvest.wavelength.iter().map(|&w| w as f32).collect(),
        harvest.t0.iter().map(|&t| t as f32).collect(),
    )
}
