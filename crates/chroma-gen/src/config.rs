use std::fs;
use std::path::Path;

use chroma_core::{ChromaError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::generator::{GeneratorOptions, DEFAULT_WORLD_SIZE_MM};
use crate::material::Material;

/// YAML-configurable parameters for a generator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Material filling the world volume.
    pub material: Material,
    /// Master seed for the toy engine.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Sort each shot's photons by direction.
    #[serde(default = "default_true")]
    pub sort_photons: bool,
    /// Produce scintillation light.
    #[serde(default = "default_true")]
    pub scintillation: bool,
    /// Edge length of the world cube in mm.
    #[serde(default = "default_world_size")]
    pub world_size_mm: f64,
    /// Toy engine tuning.
    #[serde(default)]
    pub toy: ToyEngineConfig,
}

fn default_seed() -> u64 {
    0x0C4B_0A5E_ED00_0001
}

fn default_true() -> bool {
    true
}

fn default_world_size() -> f64 {
    DEFAULT_WORLD_SIZE_MM
}

impl GeneratorConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ChromaError> {
        serde_yaml::from_str(yaml)
            .map_err(|err| ChromaError::Config(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Loads a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ChromaError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            ChromaError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            ChromaError::Config(info) => {
                ChromaError::Config(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Generator switches carried by this configuration.
    pub fn options(&self) -> GeneratorOptions {
        GeneratorOptions {
            sort_photons: self.sort_photons,
            scintillation: self.scintillation,
            world_size_mm: self.world_size_mm,
        }
    }
}

/// Tuning knobs for the toy transport engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToyEngineConfig {
    /// Cherenkov photons emitted per MeV of kinetic energy above threshold.
    #[serde(default = "default_cherenkov_yield")]
    pub cherenkov_yield_per_mev: f64,
    /// Track length in mm per MeV of kinetic energy.
    #[serde(default = "default_track_length")]
    pub track_length_per_mev: f64,
    /// Upper bound on photons recorded per shot.
    #[serde(default = "default_max_photons")]
    pub max_photons_per_shot: usize,
}

fn default_cherenkov_yield() -> f64 {
    50.0
}

fn default_track_length() -> f64 {
    5.0
}

fn default_max_photons() -> usize {
    100_000
}

impl Default for ToyEngineConfig {
    fn default() -> Self {
        Self {
            cherenkov_yield_per_mev: default_cherenkov_yield(),
            track_length_per_mev: default_track_length(),
            max_photons_per_shot: default_max_photons(),
        }
    }
}
