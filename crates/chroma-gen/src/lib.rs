#![deny(missing_docs)]
#![doc = "Photon generation: drives a particle-transport engine vertex by vertex and harvests the optical photons each shot produces."]

/// YAML configuration for generator runs.
pub mod config;
/// Transport engine contracts and the process-wide run-manager lease.
pub mod engine;
/// Vertex-by-vertex photon generation driver.
pub mod generator;
/// Material description and conversion to energy-indexed property tables.
pub mod material;
/// Deterministic toy transport engine.
pub mod toy;

pub use config::{GeneratorConfig, ToyEngineConfig};
pub use engine::{
    ParticleTable, PhotonHarvest, PrimaryConfig, RunManagerLease, TransportEngine, WorldSpec,
};
pub use generator::{GeneratorOptions, PhotonGenerator};
pub use material::{Material, MaterialPropertiesTable, PropertyVector};
pub use toy::ToyEngine;
