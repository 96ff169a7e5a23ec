//! Cells, the root universe and the geometry that owns the surfaces.

use std::collections::HashSet;

use mcvol_math::Aabb3;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, Result};
use crate::material::Material;
use crate::region::Region;
use crate::surface::{Surface, SurfaceLookup};

/// What a cell is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    /// A material, by id.
    Material(u32),
    /// Nothing.
    Void,
}

impl Fill {
    /// Material id, if filled with one.
    pub fn material(&self) -> Option<u32> {
        match self {
            Fill::Material(id) => Some(*id),
            Fill::Void => None,
        }
    }
}

/// A region of space with a uniform fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Unique cell id.
    pub id: u32,
    /// Display label.
    #[serde(default)]
    pub name: Option<String>,
    /// Cell contents.
    pub fill: Fill,
    /// Space occupied by the cell.
    pub region: Region,
    /// Volume in cm³, once known.
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Cell {
    /// Create a cell.
    pub fn new(id: u32, fill: Fill, region: Region) -> Self {
        Self {
            id,
            name: None,
            fill,
            region,
            volume: None,
        }
    }

    /// Set the display label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A collection of non-overlapping cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    /// Universe id.
    pub id: u32,
    /// Cells, in lookup order.
    pub cells: Vec<Cell>,
}

impl Universe {
    /// Create a universe from its cells.
    pub fn new(id: u32, cells: Vec<Cell>) -> Self {
        Self { id, cells }
    }
}

/// Complete CSG geometry: a root universe and the surfaces it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Root universe.
    pub root: Universe,
    /// Declared surfaces.
    pub surfaces: Vec<Surface>,
}

impl Geometry {
    /// Create a geometry.
    pub fn new(root: Universe, surfaces: Vec<Surface>) -> Self {
        Self { root, surfaces }
    }

    /// Look up a cell.
    pub fn cell(&self, id: u32) -> Option<&Cell> {
        self.root.cells.iter().find(|c| c.id == id)
    }

    /// Mutable cell lookup.
    pub fn cell_mut(&mut self, id: u32) -> Option<&mut Cell> {
        self.root.cells.iter_mut().find(|c| c.id == id)
    }

    /// Distinct material ids used as fills, in cell order.
    pub fn material_ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        for id in self.root.cells.iter().filter_map(|c| c.fill.material()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// Union of the root cells' bounds.
    ///
    /// Infinite when any cell is unbounded; empty when there are no cells.
    pub fn bounding_box(&self) -> Result<Aabb3> {
        let mut b = Aabb3::empty();
        for cell in &self.root.cells {
            b = b.union(&cell.region.bounding_box(self)?);
        }
        Ok(b)
    }

    /// Check ids are unique, surfaces are valid and every reference resolves.
    pub fn validate(&self, materials: &[Material]) -> Result<()> {
        let mut seen = HashSet::new();
        for s in &self.surfaces {
            if !seen.insert(s.id) {
                return Err(IrError::DuplicateId {
                    kind: "surface",
                    id: s.id,
                });
            }
            s.validate()?;
        }

        let mut seen = HashSet::new();
        for cell in &self.root.cells {
            if !seen.insert(cell.id) {
                return Err(IrError::DuplicateId {
                    kind: "cell",
                    id: cell.id,
                });
            }
            for id in cell.region.surface_ids() {
                self.require_surface(id)?;
            }
            if let Some(m) = cell.fill.material() {
                if !materials.iter().any(|mat| mat.id == m) {
                    return Err(IrError::UnknownMaterial {
                        cell: cell.id,
                        material: m,
                    });
                }
            }
        }
        Ok(())
    }
}

impl SurfaceLookup for Geometry {
    fn surface(&self, id: u32) -> Option<&Surface> {
        self.surfaces.surface(id)
    }
}
