//! The "spheres within spheres" benchmark.
//!
//! A 10 cm vacuum-bounded sphere of water holds a 1 cm fuel sphere with two
//! small carbon spheres inside it, wrapped in a thin air gap, plus a vapor
//! bubble near the outer edge. Every cell volume is known in closed form,
//! which makes the model a check on both stochastic estimators.

use std::collections::HashMap;

use mcvol_ir::{
    BoundaryType, Cell, DensityUnit, Estimator, Fill, Geometry, Material, Model, PercentType,
    RunMode, Settings, Surface, Universe, VolumeCalculation,
};
use mcvol_math::sphere_volume;

use crate::format::sci;
use crate::{ReferenceError, Result};

/// Material ids.
pub const FUEL: u32 = 1;
/// Liquid water.
pub const WATER: u32 = 2;
/// Water vapor (same composition as water).
pub const VAPOR: u32 = 3;
/// Graphite.
pub const CARBON: u32 = 4;
/// Air.
pub const AIR: u32 = 5;

/// Id of the root universe.
pub const ROOT_UNIVERSE: u32 = 0;

/// Cell ids, in model order.
pub const CELL_IDS: [u32; 6] = [1, 2, 3, 4, 5, 6];

/// Material ids, in request order.
pub const MATERIAL_IDS: [u32; 5] = [FUEL, WATER, VAPOR, CARBON, AIR];

/// Samples per request for the point estimator.
pub const POINT_SAMPLES: u64 = 100_000_000;

/// Samples per request for the ray estimator.
pub const RAY_SAMPLES: u64 = 30_000_000;

const CELL_LABELS: [&str; 6] = [
    "R < 0.01 cm sphere",
    "R < 0.1 cm sphere in the center",
    "0.1 < R < 1. cm layer - sm.sph.",
    "1.0 < R < 1.0001 cm layer",
    "1.0001 < R < 10 cm layer",
    "R < 0.1 cm sphere on periphery",
];

/// Surface radii and offsets of the benchmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radii {
    /// `s1`, outer vacuum boundary.
    pub outer: f64,
    /// `s2`, outside of the air gap.
    pub gap: f64,
    /// `s3`, outside of the fuel.
    pub fuel: f64,
    /// `s4`, central carbon sphere.
    pub center: f64,
    /// `s5`, small carbon sphere.
    pub small: f64,
    /// x offset of `s5`.
    pub small_x0: f64,
    /// `s6`, vapor bubble.
    pub bubble: f64,
    /// x offset of `s6`.
    pub bubble_x0: f64,
}

impl Default for Radii {
    fn default() -> Self {
        Self {
            outer: 10.0,
            gap: 1.0001,
            fuel: 1.0,
            center: 0.1,
            small: 0.01,
            small_x0: 0.2,
            bubble: 0.1,
            bubble_x0: 9.8,
        }
    }
}

impl Radii {
    fn validate(&self) -> Result<()> {
        for (name, r) in [
            ("s1", self.outer),
            ("s2", self.gap),
            ("s3", self.fuel),
            ("s4", self.center),
            ("s5", self.small),
            ("s6", self.bubble),
        ] {
            if !(r > 0.0 && r.is_finite()) {
                return Err(ReferenceError::InvalidRadius { surface: name, radius: r });
            }
        }
        Ok(())
    }
}

/// Closed-form volumes of the six benchmark cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceVolumes {
    radii: Radii,
    cells: [f64; 6],
}

impl ReferenceVolumes {
    /// Volumes for `radii`.
    ///
    /// Fails when a shell would have negative volume, i.e. the radii are not
    /// nested the way the cells assume.
    pub fn new(radii: Radii) -> Result<Self> {
        radii.validate()?;
        let v = sphere_volume;
        let cells = [
            v(radii.small),
            v(radii.center),
            v(radii.fuel) - v(radii.center) - v(radii.small),
            v(radii.gap) - v(radii.fuel),
            v(radii.outer) - v(radii.gap) - v(radii.bubble),
            v(radii.bubble),
        ];
        for (i, &volume) in cells.iter().enumerate() {
            if volume < 0.0 {
                return Err(ReferenceError::NegativeVolume {
                    shell: CELL_LABELS[i],
                    volume,
                });
            }
        }
        Ok(Self { radii, cells })
    }

    /// Radii the volumes were computed from.
    pub fn radii(&self) -> &Radii {
        &self.radii
    }

    /// Cell volumes, in cell order.
    pub fn cells(&self) -> &[f64; 6] {
        &self.cells
    }

    /// Volume of cell `id`.
    pub fn cell(&self, id: u32) -> Option<f64> {
        CELL_IDS
            .iter()
            .position(|&c| c == id)
            .map(|i| self.cells[i])
    }

    /// Volume of material `id`.
    pub fn material(&self, id: u32) -> Option<f64> {
        let c = &self.cells;
        match id {
            CARBON => Some(c[0] + c[1]),
            FUEL => Some(c[2]),
            AIR => Some(c[3]),
            WATER => Some(c[4]),
            VAPOR => Some(c[5]),
            _ => None,
        }
    }

    /// Volume of the root universe: the whole outer sphere.
    pub fn universe(&self) -> f64 {
        sphere_volume(self.radii.outer)
    }

    /// Sum of the cell volumes.
    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Reference values keyed by cell id.
    pub fn cell_map(&self) -> HashMap<u32, f64> {
        CELL_IDS.iter().copied().zip(self.cells).collect()
    }

    /// Reference values keyed by material id.
    pub fn material_map(&self) -> HashMap<u32, f64> {
        MATERIAL_IDS
            .iter()
            .filter_map(|&id| self.material(id).map(|v| (id, v)))
            .collect()
    }

    /// Reference values keyed by universe id.
    pub fn universe_map(&self) -> HashMap<u32, f64> {
        HashMap::from([(ROOT_UNIVERSE, self.universe())])
    }

    /// Cell names: the reference volume followed by a description.
    pub fn cell_names(&self) -> [String; 6] {
        std::array::from_fn(|i| format!("{} | {}", sci(self.cells[i], 10, 4), CELL_LABELS[i]))
    }
}

fn water_like(id: u32, name: &str) -> Result<Material> {
    let mut m = Material::new(id).with_name(name);
    m.add_nuclide("H1", 2.0, PercentType::Ao)?
        .add_nuclide("O16", 1.0, PercentType::Ao)?;
    m.add_s_alpha_beta("c_H_in_H2O");
    m.set_density(DensityUnit::GramPerCm3, 1.0)?;
    Ok(m)
}

/// The five benchmark materials, in id order.
pub fn materials() -> Result<Vec<Material>> {
    let mut fuel = Material::new(FUEL).with_name("fuel");
    fuel.add_element("U", 1.0, PercentType::Ao, Some(3.0))?
        .add_element("O", 2.0, PercentType::Ao, None)?;
    fuel.set_density(DensityUnit::GramPerCm3, 10.0)?;

    let mut carbon = Material::new(CARBON).with_name("carbon");
    carbon.add_nuclide("C12", 1.0, PercentType::Ao)?;
    carbon.set_density(DensityUnit::GramPerCm3, 1.8)?;

    let mut air = Material::new(AIR).with_name("air");
    air.add_nuclide("N14", 0.78, PercentType::Ao)?
        .add_nuclide("O16", 0.22, PercentType::Ao)?;
    air.set_density(DensityUnit::GramPerCm3, 1.22e-3)?;

    Ok(vec![
        fuel,
        water_like(WATER, "water")?,
        water_like(VAPOR, "vapor")?,
        carbon,
        air,
    ])
}

/// Benchmark geometry with cells named after their reference volumes.
pub fn geometry(reference: &ReferenceVolumes) -> Geometry {
    let r = reference.radii();
    let s1 = Surface::sphere(1, r.outer).with_boundary(BoundaryType::Vacuum);
    let s2 = Surface::sphere(2, r.gap);
    let s3 = Surface::sphere(3, r.fuel);
    let s4 = Surface::sphere(4, r.center);
    let s5 = Surface::sphere(5, r.small).with_center(r.small_x0, 0.0, 0.0);
    let s6 = Surface::sphere(6, r.bubble).with_center(r.bubble_x0, 0.0, 0.0);

    let regions = [
        -&s5,
        -&s4,
        s4.positive() & -&s3 & s5.positive(),
        s3.positive() & -&s2,
        s2.positive() & s6.positive() & -&s1,
        -&s6,
    ];
    let fills = [CARBON, CARBON, FUEL, AIR, WATER, VAPOR];

    let cells = reference
        .cell_names()
        .into_iter()
        .zip(regions)
        .zip(fills)
        .zip(CELL_IDS)
        .map(|(((name, region), fill), id)| {
            Cell::new(id, Fill::Material(fill), region).with_name(name)
        })
        .collect();

    Geometry::new(
        Universe::new(ROOT_UNIVERSE, cells),
        vec![s1, s2, s3, s4, s5, s6],
    )
}

/// Scale a sample count, keeping at least one sample.
pub fn scaled_samples(samples: u64, scale: f64) -> u64 {
    ((samples as f64 * scale).round() as u64).max(1)
}

/// The six volume requests over the geometry bounding box, in run order:
/// cells, materials and universe with the point estimator, then the same
/// with the ray estimator.
pub fn volume_requests(geometry: &Geometry, sample_scale: f64) -> Result<Vec<VolumeCalculation>> {
    if !(sample_scale > 0.0 && sample_scale.is_finite()) {
        return Err(ReferenceError::InvalidScale(sample_scale));
    }
    let bounds = geometry.bounding_box()?;
    let mut calcs = Vec::with_capacity(6);
    for (method, samples) in [(Estimator::Point, POINT_SAMPLES), (Estimator::Ray, RAY_SAMPLES)] {
        let n = scaled_samples(samples, sample_scale);
        calcs.push(VolumeCalculation::cells(CELL_IDS, n, &bounds).with_method(method));
        calcs.push(VolumeCalculation::materials(MATERIAL_IDS, n, &bounds).with_method(method));
        calcs.push(VolumeCalculation::universes([ROOT_UNIVERSE], n, &bounds).with_method(method));
    }
    Ok(calcs)
}

/// The complete benchmark model with sample counts multiplied by
/// `sample_scale`.
pub fn model(sample_scale: f64) -> Result<Model> {
    let reference = ReferenceVolumes::new(Radii::default())?;
    let geometry = geometry(&reference);
    let settings = Settings {
        run_mode: RunMode::Volume,
        volume_calculations: volume_requests(&geometry, sample_scale)?,
    };
    let model = Model::new(materials()?, geometry, settings);
    model.validate()?;
    log::debug!(
        "built spheres benchmark: {} cells, {} volume requests, sample scale {}",
        model.geometry.root.cells.len(),
        model.settings.volume_calculations.len(),
        sample_scale
    );
    Ok(model)
}
