//! Compiled geometry for fast point location.
//!
//! Cell regions are rewritten to refer to surfaces by position instead of id,
//! and each cell keeps its bounding box as a cheap rejection test.

use std::collections::HashMap;

use mcvol_ir::{Fill, Geometry, IrError, Region, Result, Side, Surface};
use mcvol_math::{Aabb3, Point3};

/// Region tree with surface ids resolved to indices.
#[derive(Debug, Clone)]
enum CompiledRegion {
    Halfspace(usize, Side),
    Intersection(Vec<CompiledRegion>),
    Union(Vec<CompiledRegion>),
    Complement(Box<CompiledRegion>),
}

impl CompiledRegion {
    fn compile(region: &Region, slots: &HashMap<u32, usize>) -> Result<Self> {
        let compile_all = |nodes: &[Region]| -> Result<Vec<CompiledRegion>> {
            nodes.iter().map(|n| Self::compile(n, slots)).collect()
        };
        Ok(match region {
            Region::Halfspace { surface, side } => {
                let slot = slots
                    .get(surface)
                    .copied()
                    .ok_or(IrError::UnknownSurface(*surface))?;
                CompiledRegion::Halfspace(slot, *side)
            }
            Region::Intersection(nodes) => CompiledRegion::Intersection(compile_all(nodes)?),
            Region::Union(nodes) => CompiledRegion::Union(compile_all(nodes)?),
            Region::Complement(node) => {
                CompiledRegion::Complement(Box::new(Self::compile(node, slots)?))
            }
        })
    }

    fn contains(&self, p: &Point3, surfaces: &[Surface]) -> bool {
        match self {
            CompiledRegion::Halfspace(slot, side) => surfaces[*slot].side_of(p) == *side,
            CompiledRegion::Intersection(nodes) => nodes.iter().all(|n| n.contains(p, surfaces)),
            CompiledRegion::Union(nodes) => nodes.iter().any(|n| n.contains(p, surfaces)),
            CompiledRegion::Complement(node) => !node.contains(p, surfaces),
        }
    }
}

/// A root-universe cell ready for point queries.
#[derive(Debug, Clone)]
pub struct IndexedCell {
    /// Cell id.
    pub id: u32,
    /// What the cell is filled with.
    pub fill: Fill,
    /// Conservative bounds of the cell region.
    pub bounds: Aabb3,
    region: CompiledRegion,
}

impl IndexedCell {
    /// Whether `p` lies inside the cell.
    #[inline]
    pub fn contains(&self, p: &Point3, surfaces: &[Surface]) -> bool {
        self.bounds.contains(p) && self.region.contains(p, surfaces)
    }
}

/// Point-location structure over a [`Geometry`].
#[derive(Debug, Clone)]
pub struct GeometryIndex {
    universe: u32,
    surfaces: Vec<Surface>,
    cells: Vec<IndexedCell>,
}

impl GeometryIndex {
    /// Compile `geometry`. Fails on dangling surface references.
    pub fn build(geometry: &Geometry) -> Result<Self> {
        let slots: HashMap<u32, usize> = geometry
            .surfaces
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();

        let mut cells = Vec::with_capacity(geometry.root.cells.len());
        for cell in &geometry.root.cells {
            cells.push(IndexedCell {
                id: cell.id,
                fill: cell.fill,
                bounds: cell.region.bounding_box(geometry)?,
                region: CompiledRegion::compile(&cell.region, &slots)?,
            });
        }
        log::debug!(
            "indexed {} cells over {} surfaces",
            cells.len(),
            geometry.surfaces.len()
        );

        Ok(Self {
            universe: geometry.root.id,
            surfaces: geometry.surfaces.clone(),
            cells,
        })
    }

    /// Id of the root universe.
    pub fn universe(&self) -> u32 {
        self.universe
    }

    /// Indexed cells, in geometry order.
    pub fn cells(&self) -> &[IndexedCell] {
        &self.cells
    }

    /// Surfaces, in geometry order.
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Position of the cell with `id`.
    pub fn cell_index(&self, id: u32) -> Option<usize> {
        self.cells.iter().position(|c| c.id == id)
    }

    /// Index of the first cell containing `p`, or `None` outside the geometry.
    pub fn find_cell(&self, p: &Point3) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.contains(p, &self.surfaces))
    }
}
