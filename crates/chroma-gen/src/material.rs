use std::collections::BTreeMap;
use std::f64::consts::PI;

use chroma_core::{ChromaError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// ħc in MeV·mm (engine units).
pub const HBARC_MEV_MM: f64 = 197.326_980_4e-12;
/// One nanometre in mm.
pub const NANOMETER_MM: f64 = 1e-6;

/// Converts a photon wavelength in nm to its energy in MeV.
pub fn wavelength_to_energy(wavelength_nm: f64) -> f64 {
    2.0 * PI * HBARC_MEV_MM / (wavelength_nm * NANOMETER_MM)
}

/// Converts a photon energy in MeV to its wavelength in nm.
pub fn energy_to_wavelength(energy_mev: f64) -> f64 {
    2.0 * PI * HBARC_MEV_MM / energy_mev / NANOMETER_MM
}

/// Bulk material filling the generator world.
///
/// Wavelength-indexed tables are `[wavelength_nm, value]` rows in ascending
/// wavelength order. Time-indexed tables are `[time_ns, value]` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material name passed to the engine.
    #[serde(default = "default_material_name")]
    pub name: String,
    /// Density in g/cm³.
    pub density: f64,
    /// Element symbol to fraction by weight.
    pub composition: BTreeMap<String, f64>,
    /// Refractive index against wavelength.
    pub refractive_index: Vec<[f64; 2]>,
    /// Scintillation photons per MeV deposited.
    #[serde(default)]
    pub scintillation_light_yield: Option<f64>,
    /// Scintillation emission spectrum against wavelength.
    #[serde(default)]
    pub scintillation_spectrum: Option<Vec<[f64; 2]>>,
    /// Scintillation emission time profile.
    #[serde(default)]
    pub scintillation_waveform: Option<Vec<[f64; 2]>>,
    /// Scintillation time modulation curve.
    #[serde(default)]
    pub scintillation_mod: Option<Vec<[f64; 2]>>,
}

fn default_material_name() -> String {
    "world_material".into()
}

/// Property curve indexed by photon energy (MeV) or time (ns).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyVector {
    /// Abscissae in ascending order.
    pub energies: Vec<f64>,
    /// Values aligned with `energies`.
    pub values: Vec<f64>,
}

impl PropertyVector {
    /// Linear interpolation, clamped to the end values outside the table.
    /// `None` for an empty table or a non-finite `x`.
    pub fn value_at(&self, x: f64) -> Option<f64> {
        if !x.is_finite() {
            return None;
        }
        let first = *self.energies.first()?;
        let last = *self.energies.last()?;
        if x <= first {
            return self.values.first().copied();
        }
        if x >= last {
            return self.values.last().copied();
        }
        let upper = self.energies.partition_point(|&e| e < x);
        let (x0, x1) = (self.energies[upper - 1], self.energies[upper]);
        let (y0, y1) = (self.values[upper - 1], self.values[upper]);
        Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
    }
}

/// Material description in the form the transport engine loads it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialPropertiesTable {
    /// Material name.
    pub name: String,
    /// Density in g/cm³.
    pub density: f64,
    /// Elements and their fraction by weight.
    pub elements: Vec<(String, f64)>,
    /// Curves keyed by engine property name (`RINDEX`, `SCINTILLATION`, ...).
    pub properties: BTreeMap<String, PropertyVector>,
    /// Scalar properties keyed by engine property name (`LIGHT_YIELD`).
    pub const_properties: BTreeMap<String, f64>,
}

impl MaterialPropertiesTable {
    /// Looks up a curve by engine property name.
    pub fn property(&self, key: &str) -> Option<&PropertyVector> {
        self.properties.get(key)
    }

    /// Looks up a scalar property by engine property name.
    pub fn const_property(&self, key: &str) -> Option<f64> {
        self.const_properties.get(key).copied()
    }
}

fn material_error(
    code: &str,
    message: &str,
    material: &Material,
    context: &[(&str, String)],
) -> ChromaError {
    let mut info = ErrorInfo::new(code, message).with_context("material", material.name.clone());
    for (key, value) in context {
        info = info.with_context(*key, value.clone());
    }
    ChromaError::Engine(info)
}

/// Reverses a wavelength-ascending table into an energy-ascending curve.
fn energy_indexed(
    key: &str,
    rows: &[[f64; 2]],
    material: &Material,
) -> Result<PropertyVector, ChromaError> {
    if rows.is_empty() {
        return Err(material_error(
            "empty-property",
            "property table has no rows",
            material,
            &[("property", key.to_string())],
        ));
    }
    for (idx, row) in rows.iter().enumerate() {
        let context = [("property", key.to_string()), ("row", idx.to_string())];
        if !(row[0] > 0.0 && row[0].is_finite()) {
            return Err(material_error(
                "non-positive-wavelength",
                "wavelengths must be positive",
                material,
                &context,
            ));
        }
        if idx > 0 && row[0] <= rows[idx - 1][0] {
            return Err(material_error(
                "unsorted-wavelength",
                "wavelengths must be strictly ascending",
                material,
                &context,
            ));
        }
    }
    Ok(PropertyVector {
        energies: rows.iter().rev().map(|row| wavelength_to_energy(row[0])).collect(),
        values: rows.iter().rev().map(|row| row[1]).collect(),
    })
}

fn time_indexed(rows: &[[f64; 2]]) -> PropertyVector {
    PropertyVector {
        energies: rows.iter().map(|row| row[0]).collect(),
        values: rows.iter().map(|row| row[1]).collect(),
    }
}

/// Builds the energy-indexed properties table the engine loads.
///
/// `RINDEX` and `SCINTILLATION` are reversed and converted from wavelength
/// to photon energy so the abscissae ascend. `SCINTWAVEFORM` and `SCINTMOD`
/// are time-indexed and copied unchanged.
pub fn properties_table(material: &Material) -> Result<MaterialPropertiesTable, ChromaError> {
    if !(material.density > 0.0 && material.density.is_finite()) {
        return Err(material_error(
            "density",
            "density must be positive",
            material,
            &[("density", material.density.to_string())],
        ));
    }
    if material.composition.is_empty() {
        return Err(material_error(
            "empty-composition",
            "material has no elements",
            material,
            &[],
        ));
    }
    let mut total = 0.0_f64;
    for (element, fraction) in &material.composition {
        if !(*fraction > 0.0 && *fraction <= 1.0) {
            return Err(material_error(
                "composition-fraction",
                "fraction by weight outside (0, 1]",
                material,
                &[("element", element.clone()), ("fraction", fraction.to_string())],
            ));
        }
        total += *fraction;
    }
    if (total - 1.0).abs() > 1e-3 {
        return Err(material_error(
            "composition-sum",
            "fractions by weight must sum to one",
            material,
            &[("sum", total.to_string())],
        ));
    }

    let mut table = MaterialPropertiesTable {
        name: material.name.clone(),
        density: material.density,
        elements: material
            .composition
            .iter()
            .map(|(element, fraction)| (element.clone(), *fraction))
            .collect(),
        ..MaterialPropertiesTable::default()
    };
    table.properties.insert(
        "RINDEX".into(),
        energy_indexed("RINDEX", &material.refractive_index, material)?,
    );
    if let Some(yield_per_mev) = material.scintillation_light_yield.filter(|y| *y > 0.0) {
        table
            .const_properties
            .insert("LIGHT_YIELD".into(), yield_per_mev);
    }
    if let Some(spectrum) = material.scintillation_spectrum.as_deref().filter(|s| !s.is_empty()) {
        table.properties.insert(
            "SCINTILLATION".into(),
            energy_indexed("SCINTILLATION", spectrum, material)?,
        );
    }
    if let Some(waveform) = material.scintillation_waveform.as_deref().filter(|s| !s.is_empty()) {
        table
            .properties
            .insert("SCINTWAVEFORM".into(), time_indexed(waveform));
    }
    if let Some(modulation) = material.scintillation_mod.as_deref().filter(|s| !s.is_empty()) {
        table
            .properties
            .insert("SCINTMOD".into(), time_indexed(modulation));
    }
    Ok(table)
}
