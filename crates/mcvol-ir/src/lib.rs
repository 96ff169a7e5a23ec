#![warn(missing_docs)]

//! Model description for the mcvol volume engine.
//!
//! A [`Model`] bundles everything the engine needs: materials, a CSG
//! [`Geometry`] built from surface half-spaces, and [`Settings`] listing the
//! stochastic [`VolumeCalculation`]s to perform. The description is purely
//! declarative; sampling is handled by `mcvol-volume`.
//!
//! # Example
//!
//! ```
//! use mcvol_ir::{Cell, Fill, Geometry, Surface, Universe};
//!
//! let outer = Surface::sphere(1, 10.0);
//! let inner = Surface::sphere(2, 1.0);
//! let cells = vec![
//!     Cell::new(1, Fill::Void, -&inner),
//!     Cell::new(2, Fill::Void, inner.positive() & -&outer),
//! ];
//! let geometry = Geometry::new(Universe::new(0, cells), vec![outer, inner]);
//! assert_eq!(geometry.bounding_box().unwrap().volume(), 8000.0);
//! ```

pub mod error;
pub mod geometry;
pub mod material;
pub mod nuclide;
pub mod region;
pub mod surface;
pub mod volume;

pub use error::{IrError, Result};
pub use geometry::{Cell, Fill, Geometry, Universe};
pub use material::{Component, Density, DensityUnit, Material, PercentType};
pub use region::{Region, Side};
pub use surface::{BoundaryType, Surface, SurfaceKind, SurfaceLookup};
pub use volume::{
    DomainType, Estimator, RunMode, Settings, Trigger, TriggerMetric, VolumeCalculation,
};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A complete volume problem; also the JSON model file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Materials referenced by cell fills.
    pub materials: Vec<Material>,
    /// CSG geometry.
    pub geometry: Geometry,
    /// Run settings and volume requests.
    #[serde(default)]
    pub settings: Settings,
}

impl Model {
    /// Create a model.
    pub fn new(materials: Vec<Material>, geometry: Geometry, settings: Settings) -> Self {
        Self {
            materials,
            geometry,
            settings,
        }
    }

    /// Look up a material.
    pub fn material(&self, id: u32) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Mutable material lookup.
    pub fn material_mut(&mut self, id: u32) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.id == id)
    }

    /// Validate materials, geometry and every volume request.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for m in &self.materials {
            if !seen.insert(m.id) {
                return Err(IrError::DuplicateId {
                    kind: "material",
                    id: m.id,
                });
            }
        }
        self.geometry.validate(&self.materials)?;
        for calc in &self.settings.volume_calculations {
            calc.validate()?;
        }
        Ok(())
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcvol_math::Aabb3;

    fn small_model() -> Model {
        let mut water = Material::new(1).with_name("water");
        water.add_nuclide("H1", 2.0, PercentType::Ao).unwrap();
        water.add_nuclide("O16", 1.0, PercentType::Ao).unwrap();
        water.set_density(DensityUnit::GramPerCm3, 1.0).unwrap();

        let s = Surface::sphere(1, 1.0).with_boundary(BoundaryType::Vacuum);
        let cells = vec![Cell::new(10, Fill::Material(1), -&s)];
        let geometry = Geometry::new(Universe::new(0, cells), vec![s]);
        let bounds = geometry.bounding_box().unwrap();
        let settings = Settings {
            run_mode: RunMode::Volume,
            volume_calculations: vec![VolumeCalculation::cells([10], 100, &bounds)],
        };
        Model::new(vec![water], geometry, settings)
    }

    #[test]
    fn test_json_round_trip() {
        let model = small_model();
        let json = model.to_json().unwrap();
        assert!(json.contains("\"region\": \"-1\""));
        let back = Model::from_json(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_validate() {
        let mut model = small_model();
        assert!(model.validate().is_ok());

        model.materials.push(Material::new(1));
        assert!(matches!(
            model.validate(),
            Err(IrError::DuplicateId { kind: "material", id: 1 })
        ));

        let mut model = small_model();
        model.settings.volume_calculations.push(VolumeCalculation::cells(
            [10],
            0,
            &Aabb3::from_corners([0.0; 3], [1.0; 3]),
        ));
        assert!(matches!(model.validate(), Err(IrError::InvalidVolumeCalc(_))));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(Model::from_json("{"), Err(IrError::Json(_))));
    }
}
