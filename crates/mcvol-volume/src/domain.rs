//! Mapping from located cells to requested domains.

use mcvol_ir::{DomainType, Fill, Material, VolumeCalculation};
use mcvol_raytrace::GeometryIndex;

use crate::error::{Result, VolumeError};

/// For every indexed cell, the request domains that contain it.
#[derive(Debug, Clone)]
pub(crate) struct DomainMap {
    per_cell: Vec<Vec<usize>>,
    domains: usize,
}

impl DomainMap {
    /// Resolve the request's domain ids against the geometry.
    pub fn resolve(
        calc: &VolumeCalculation,
        index: &GeometryIndex,
        materials: &[Material],
    ) -> Result<Self> {
        let unknown = |id| VolumeError::UnknownDomain {
            kind: calc.domain_type.as_str(),
            id,
        };
        for &id in &calc.domain_ids {
            let exists = match calc.domain_type {
                DomainType::Cell => index.cell_index(id).is_some(),
                DomainType::Material => materials.iter().any(|m| m.id == id),
                DomainType::Universe => index.universe() == id,
            };
            if !exists {
                return Err(unknown(id));
            }
        }

        let per_cell = index
            .cells()
            .iter()
            .map(|cell| {
                calc.domain_ids
                    .iter()
                    .enumerate()
                    .filter(|&(_, &id)| match calc.domain_type {
                        DomainType::Cell => cell.id == id,
                        DomainType::Material => cell.fill == Fill::Material(id),
                        DomainType::Universe => true,
                    })
                    .map(|(d, _)| d)
                    .collect()
            })
            .collect();

        Ok(Self {
            per_cell,
            domains: calc.domain_ids.len(),
        })
    }

    /// Number of domains in the request.
    pub fn len(&self) -> usize {
        self.domains
    }

    /// Domains containing cell `cell`.
    #[inline]
    pub fn domains_of(&self, cell: usize) -> &[usize] {
        &self.per_cell[cell]
    }

    /// Cells belonging to domain `domain`.
    pub fn cells_of(&self, domain: usize) -> Vec<usize> {
        (0..self.per_cell.len())
            .filter(|&c| self.per_cell[c].contains(&domain))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcvol_ir::{Cell, Geometry, Surface, Universe};
    use mcvol_math::Aabb3;

    fn index() -> GeometryIndex {
        let a = Surface::sphere(1, 1.0);
        let b = Surface::sphere(2, 2.0);
        let c = Surface::sphere(3, 3.0);
        let cells = vec![
            Cell::new(10, Fill::Material(1), -&a),
            Cell::new(20, Fill::Material(2), a.positive() & -&b),
            Cell::new(30, Fill::Material(1), b.positive() & -&c),
        ];
        GeometryIndex::build(&Geometry::new(Universe::new(0, cells), vec![a, b, c])).unwrap()
    }

    fn materials() -> Vec<Material> {
        vec![Material::new(1), Material::new(2), Material::new(3)]
    }

    fn bounds() -> Aabb3 {
        Aabb3::from_corners([-3.0; 3], [3.0; 3])
    }

    #[test]
    fn test_material_domains() {
        let calc = VolumeCalculation::materials([1, 2, 3], 1, &bounds());
        let map = DomainMap::resolve(&calc, &index(), &materials()).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.domains_of(0), &[0]);
        assert_eq!(map.domains_of(1), &[1]);
        assert_eq!(map.domains_of(2), &[0]);
        assert_eq!(map.cells_of(0), vec![0, 2]);
        assert!(map.cells_of(2).is_empty());
    }

    #[test]
    fn test_universe_contains_every_cell() {
        let calc = VolumeCalculation::universes([0], 1, &bounds());
        let map = DomainMap::resolve(&calc, &index(), &materials()).unwrap();
        assert_eq!(map.cells_of(0), vec![0, 1, 2]);
    }

    #[test]
    fn test_unknown_domains() {
        let calc = VolumeCalculation::cells([10, 99], 1, &bounds());
        let err = DomainMap::resolve(&calc, &index(), &materials()).unwrap_err();
        assert!(matches!(err, VolumeError::UnknownDomain { kind: "cell", id: 99 }));

        let calc = VolumeCalculation::universes([4], 1, &bounds());
        let err = DomainMap::resolve(&calc, &index(), &materials()).unwrap_err();
        assert!(matches!(err, VolumeError::UnknownDomain { kind: "universe", id: 4 }));
    }
}
