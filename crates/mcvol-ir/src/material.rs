//! Material definitions: nuclide composition, density and thermal scattering data.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, Result};
use crate::nuclide::{atomic_mass, enriched_uranium, natural_isotopes, AVOGADRO};

/// Whether a composition fraction is by atom or by weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentType {
    /// Atom fraction.
    #[default]
    Ao,
    /// Weight fraction.
    Wo,
}

impl PercentType {
    /// XML attribute name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PercentType::Ao => "ao",
            PercentType::Wo => "wo",
        }
    }
}

/// Units of a material density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DensityUnit {
    /// Grams per cubic centimeter.
    #[serde(rename = "g/cm3")]
    GramPerCm3,
    /// Kilograms per cubic meter.
    #[serde(rename = "kg/m3")]
    KilogramPerM3,
    /// Atoms per barn-centimeter.
    #[serde(rename = "atom/b-cm")]
    AtomPerBarnCm,
    /// Atoms per cubic centimeter.
    #[serde(rename = "atom/cm3")]
    AtomPerCm3,
    /// Component fractions are absolute atom densities (atom/b-cm).
    #[serde(rename = "sum")]
    Sum,
}

impl DensityUnit {
    /// Unit string used in the XML descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            DensityUnit::GramPerCm3 => "g/cm3",
            DensityUnit::KilogramPerM3 => "kg/m3",
            DensityUnit::AtomPerBarnCm => "atom/b-cm",
            DensityUnit::AtomPerCm3 => "atom/cm3",
            DensityUnit::Sum => "sum",
        }
    }
}

/// A density value with units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Density {
    /// Units of `value`.
    pub units: DensityUnit,
    /// Density value (ignored for [`DensityUnit::Sum`]).
    pub value: f64,
}

/// One nuclide entry of a material composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Nuclide name, e.g. `"U235"`.
    pub nuclide: String,
    /// Fraction (relative unless the density is [`DensityUnit::Sum`]).
    pub fraction: f64,
    /// Atom or weight fraction.
    #[serde(default)]
    pub percent_type: PercentType,
}

/// A homogeneous material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Unique material id.
    pub id: u32,
    /// Optional human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the material takes part in depletion.
    #[serde(default)]
    pub depletable: bool,
    /// Density; required before atom densities can be computed.
    #[serde(default)]
    pub density: Option<Density>,
    /// Nuclide composition, in insertion order.
    #[serde(default)]
    pub components: Vec<Component>,
    /// Thermal scattering (S(α,β)) table names.
    #[serde(default)]
    pub sab: Vec<String>,
    /// Volume in cm³, once known.
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Material {
    /// Create an empty material.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: None,
            depletable: false,
            density: None,
            components: Vec::new(),
            sab: Vec::new(),
            volume: None,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a single nuclide.
    pub fn add_nuclide(
        &mut self,
        nuclide: impl Into<String>,
        fraction: f64,
        percent_type: PercentType,
    ) -> Result<&mut Self> {
        let nuclide = nuclide.into();
        if !(fraction > 0.0 && fraction.is_finite()) {
            return Err(self.invalid(format!("fraction of {nuclide} must be positive")));
        }
        // Validates the name up front so atom density evaluation cannot fail on it later.
        atomic_mass(&nuclide)?;
        self.components.push(Component {
            nuclide,
            fraction,
            percent_type,
        });
        Ok(self)
    }

    /// Add an element, expanded into its natural isotopes.
    ///
    /// `enrichment` (wt% U-235) is only accepted for uranium.
    pub fn add_element(
        &mut self,
        element: &str,
        fraction: f64,
        percent_type: PercentType,
        enrichment: Option<f64>,
    ) -> Result<&mut Self> {
        if !(fraction > 0.0 && fraction.is_finite()) {
            return Err(self.invalid(format!("fraction of {element} must be positive")));
        }
        let isotopes = match enrichment {
            Some(e) if element == "U" => enriched_uranium(e)?,
            Some(_) => {
                return Err(IrError::InvalidEnrichment(format!(
                    "enrichment is only supported for U, not {element}"
                )))
            }
            None => natural_isotopes(element)?,
        };

        let shares = match percent_type {
            PercentType::Ao => isotopes,
            PercentType::Wo => {
                let mut masses = Vec::with_capacity(isotopes.len());
                for (nuclide, f) in isotopes {
                    masses.push((nuclide, f * atomic_mass(nuclide)?));
                }
                let total: f64 = masses.iter().map(|(_, m)| m).sum();
                masses.into_iter().map(|(n, m)| (n, m / total)).collect()
            }
        };

        for (nuclide, share) in shares {
            self.components.push(Component {
                nuclide: nuclide.to_string(),
                fraction: fraction * share,
                percent_type,
            });
        }
        Ok(self)
    }

    /// Attach a thermal scattering table.
    pub fn add_s_alpha_beta(&mut self, table: impl Into<String>) -> &mut Self {
        self.sab.push(table.into());
        self
    }

    /// Set the density.
    pub fn set_density(&mut self, units: DensityUnit, value: f64) -> Result<&mut Self> {
        if units != DensityUnit::Sum && !(value > 0.0 && value.is_finite()) {
            return Err(self.invalid(format!("density {value} must be positive")));
        }
        self.density = Some(Density { units, value });
        Ok(self)
    }

    /// Distinct nuclide names in first-appearance order.
    pub fn nuclides(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for c in &self.components {
            if !names.contains(&c.nuclide.as_str()) {
                names.push(&c.nuclide);
            }
        }
        names
    }

    /// Nuclide atom densities in atom/b-cm, duplicates merged.
    pub fn atom_densities(&self) -> Result<Vec<(String, f64)>> {
        let density = self
            .density
            .ok_or_else(|| self.invalid("density is not set".into()))?;
        if self.components.is_empty() {
            return Err(self.invalid("no nuclides".into()));
        }
        let percent_type = self.components[0].percent_type;
        if self.components.iter().any(|c| c.percent_type != percent_type) {
            return Err(self.invalid("mixes atom and weight fractions".into()));
        }

        // Merge repeated nuclides, keeping first-appearance order.
        let mut merged: Vec<(String, f64, f64)> = Vec::new();
        for c in &self.components {
            match merged.iter_mut().find(|(n, _, _)| *n == c.nuclide) {
                Some(entry) => entry.1 += c.fraction,
                None => merged.push((c.nuclide.clone(), c.fraction, atomic_mass(&c.nuclide)?)),
            }
        }

        if density.units == DensityUnit::Sum {
            if percent_type == PercentType::Wo {
                return Err(self.invalid("'sum' density needs atom densities".into()));
            }
            return Ok(merged.into_iter().map(|(n, f, _)| (n, f)).collect());
        }

        // Atom fractions, normalized.
        let atom_fractions: Vec<f64> = match percent_type {
            PercentType::Ao => merged.iter().map(|(_, f, _)| *f).collect(),
            PercentType::Wo => merged.iter().map(|(_, w, a)| w / a).collect(),
        };
        let total: f64 = atom_fractions.iter().sum();
        let atom_fractions: Vec<f64> = atom_fractions.iter().map(|f| f / total).collect();

        let total_density = match density.units {
            DensityUnit::GramPerCm3 | DensityUnit::KilogramPerM3 => {
                let grams_per_cm3 = if density.units == DensityUnit::KilogramPerM3 {
                    density.value * 1e-3
                } else {
                    density.value
                };
                let mean_mass: f64 = merged
                    .iter()
                    .zip(&atom_fractions)
                    .map(|((_, _, a), f)| a * f)
                    .sum();
                grams_per_cm3 * AVOGADRO / mean_mass * 1e-24
            }
            DensityUnit::AtomPerBarnCm => density.value,
            DensityUnit::AtomPerCm3 => density.value * 1e-24,
            DensityUnit::Sum => unreachable!("handled above"),
        };

        Ok(merged
            .into_iter()
            .zip(atom_fractions)
            .map(|((n, _, _), f)| (n, f * total_density))
            .collect())
    }

    fn invalid(&self, reason: String) -> IrError {
        IrError::InvalidMaterial {
            id: self.id,
            reason,
        }
    }
}
