//! Quadric surfaces bounding the half-spaces that regions are built from.

use std::ops::Neg;

use mcvol_math::{Aabb3, Point3};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, Result};
use crate::region::{Region, Side};

/// Behavior of particles crossing a surface. Volume estimation ignores it,
/// but it is part of the engine input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryType {
    /// Particles pass through.
    #[default]
    Transmission,
    /// Particles leaving through the surface are killed.
    Vacuum,
    /// Particles are mirrored back.
    Reflective,
}

impl BoundaryType {
    /// XML attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryType::Transmission => "transmission",
            BoundaryType::Vacuum => "vacuum",
            BoundaryType::Reflective => "reflective",
        }
    }
}

/// Surface equation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SurfaceKind {
    /// `(x-x0)² + (y-y0)² + (z-z0)² - r² = 0`
    Sphere {
        /// Center x.
        x0: f64,
        /// Center y.
        y0: f64,
        /// Center z.
        z0: f64,
        /// Radius.
        r: f64,
    },
    /// `x - x0 = 0`
    XPlane {
        /// Plane position.
        x0: f64,
    },
    /// `y - y0 = 0`
    YPlane {
        /// Plane position.
        y0: f64,
    },
    /// `z - z0 = 0`
    ZPlane {
        /// Plane position.
        z0: f64,
    },
    /// `(x-x0)² + (y-y0)² - r² = 0`
    ZCylinder {
        /// Axis x.
        x0: f64,
        /// Axis y.
        y0: f64,
        /// Radius.
        r: f64,
    },
}

impl SurfaceKind {
    /// Type name used in the XML descriptors.
    pub fn type_name(&self) -> &'static str {
        match self {
            SurfaceKind::Sphere { .. } => "sphere",
            SurfaceKind::XPlane { .. } => "x-plane",
            SurfaceKind::YPlane { .. } => "y-plane",
            SurfaceKind::ZPlane { .. } => "z-plane",
            SurfaceKind::ZCylinder { .. } => "z-cylinder",
        }
    }

    /// Coefficients in XML order.
    pub fn coefficients(&self) -> Vec<f64> {
        match *self {
            SurfaceKind::Sphere { x0, y0, z0, r } => vec![x0, y0, z0, r],
            SurfaceKind::XPlane { x0 } => vec![x0],
            SurfaceKind::YPlane { y0 } => vec![y0],
            SurfaceKind::ZPlane { z0 } => vec![z0],
            SurfaceKind::ZCylinder { x0, y0, r } => vec![x0, y0, r],
        }
    }
}

/// A surface with an id, referenced by region half-spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Unique surface id.
    pub id: u32,
    /// Surface equation.
    #[serde(flatten)]
    pub kind: SurfaceKind,
    /// Boundary condition.
    #[serde(default)]
    pub boundary: BoundaryType,
    /// Optional label.
    #[serde(default)]
    pub name: Option<String>,
}

impl Surface {
    /// Sphere centered at the origin.
    pub fn sphere(id: u32, r: f64) -> Self {
        Self::new(
            id,
            SurfaceKind::Sphere {
                x0: 0.0,
                y0: 0.0,
                z0: 0.0,
                r,
            },
        )
    }

    /// Plane perpendicular to x.
    pub fn x_plane(id: u32, x0: f64) -> Self {
        Self::new(id, SurfaceKind::XPlane { x0 })
    }

    /// Plane perpendicular to y.
    pub fn y_plane(id: u32, y0: f64) -> Self {
        Self::new(id, SurfaceKind::YPlane { y0 })
    }

    /// Plane perpendicular to z.
    pub fn z_plane(id: u32, z0: f64) -> Self {
        Self::new(id, SurfaceKind::ZPlane { z0 })
    }

    /// Infinite cylinder parallel to z.
    pub fn z_cylinder(id: u32, x0: f64, y0: f64, r: f64) -> Self {
        Self::new(id, SurfaceKind::ZCylinder { x0, y0, r })
    }

    /// Surface from an explicit equation.
    pub fn new(id: u32, kind: SurfaceKind) -> Self {
        Self {
            id,
            kind,
            boundary: BoundaryType::default(),
            name: None,
        }
    }

    /// Move the center of a sphere (other kinds are unchanged).
    pub fn with_center(mut self, x: f64, y: f64, z: f64) -> Self {
        if let SurfaceKind::Sphere { x0, y0, z0, .. } = &mut self.kind {
            *x0 = x;
            *y0 = y;
            *z0 = z;
        }
        self
    }

    /// Set the boundary condition.
    pub fn with_boundary(mut self, boundary: BoundaryType) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set a label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Radius for spheres and cylinders.
    pub fn radius(&self) -> Option<f64> {
        match self.kind {
            SurfaceKind::Sphere { r, .. } | SurfaceKind::ZCylinder { r, .. } => Some(r),
            _ => None,
        }
    }

    /// Reject non-finite coefficients and non-positive radii.
    pub fn validate(&self) -> Result<()> {
        if self.kind.coefficients().iter().any(|c| !c.is_finite()) {
            return Err(IrError::InvalidSurface {
                id: self.id,
                reason: "coefficients must be finite".into(),
            });
        }
        if let Some(r) = self.radius() {
            if r <= 0.0 {
                return Err(IrError::InvalidSurface {
                    id: self.id,
                    reason: format!("radius {r} must be positive"),
                });
            }
        }
        Ok(())
    }

    /// Signed value of the surface equation at `p`; negative inside.
    #[inline]
    pub fn evaluate(&self, p: &Point3) -> f64 {
        match self.kind {
            SurfaceKind::Sphere { x0, y0, z0, r } => {
                let (dx, dy, dz) = (p.x - x0, p.y - y0, p.z - z0);
                dx * dx + dy * dy + dz * dz - r * r
            }
            SurfaceKind::XPlane { x0 } => p.x - x0,
            SurfaceKind::YPlane { y0 } => p.y - y0,
            SurfaceKind::ZPlane { z0 } => p.z - z0,
            SurfaceKind::ZCylinder { x0, y0, r } => {
                let (dx, dy) = (p.x - x0, p.y - y0);
                dx * dx + dy * dy - r * r
            }
        }
    }

    /// Which side of the surface `p` lies on. Points exactly on the surface
    /// count as positive.
    #[inline]
    pub fn side_of(&self, p: &Point3) -> Side {
        if self.evaluate(p) < 0.0 {
            Side::Negative
        } else {
            Side::Positive
        }
    }

    /// Axis-aligned bounds of one half-space (infinite where unbounded).
    pub fn halfspace_bounds(&self, side: Side) -> Aabb3 {
        let mut b = Aabb3::infinite();
        match (self.kind, side) {
            (SurfaceKind::Sphere { x0, y0, z0, r }, Side::Negative) => {
                b = Aabb3::around(&Point3::new(x0, y0, z0), r);
            }
            (SurfaceKind::ZCylinder { x0, y0, r }, Side::Negative) => {
                b.min.x = x0 - r;
                b.max.x = x0 + r;
                b.min.y = y0 - r;
                b.max.y = y0 + r;
            }
            (SurfaceKind::XPlane { x0 }, Side::Negative) => b.max.x = x0,
            (SurfaceKind::XPlane { x0 }, Side::Positive) => b.min.x = x0,
            (SurfaceKind::YPlane { y0 }, Side::Negative) => b.max.y = y0,
            (SurfaceKind::YPlane { y0 }, Side::Positive) => b.min.y = y0,
            (SurfaceKind::ZPlane { z0 }, Side::Negative) => b.max.z = z0,
            (SurfaceKind::ZPlane { z0 }, Side::Positive) => b.min.z = z0,
            (SurfaceKind::Sphere { .. } | SurfaceKind::ZCylinder { .. }, Side::Positive) => {}
        }
        b
    }

    /// Half-space on the negative (inner) side.
    pub fn negative(&self) -> Region {
        Region::halfspace(self.id, Side::Negative)
    }

    /// Half-space on the positive (outer) side.
    pub fn positive(&self) -> Region {
        Region::halfspace(self.id, Side::Positive)
    }
}

impl Neg for &Surface {
    type Output = Region;

    fn neg(self) -> Region {
        self.negative()
    }
}

/// Lookup of surfaces by id, used when evaluating regions.
pub trait SurfaceLookup {
    /// The surface with `id`, if declared.
    fn surface(&self, id: u32) -> Option<&Surface>;

    /// Like [`SurfaceLookup::surface`] but as an error.
    fn require_surface(&self, id: u32) -> Result<&Surface> {
        self.surface(id).ok_or(IrError::UnknownSurface(id))
    }
}

impl SurfaceLookup for [Surface] {
    fn surface(&self, id: u32) -> Option<&Surface> {
        self.iter().find(|s| s.id == id)
    }
}

impl SurfaceLookup for Vec<Surface> {
    fn surface(&self, id: u32) -> Option<&Surface> {
        self.as_slice().surface(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_evaluate() {
        let s = Surface::sphere(1, 2.0).with_center(1.0, 0.0, 0.0);
        assert!((s.evaluate(&Point3::new(1.0, 0.0, 0.0)) + 4.0).abs() < 1e-12);
        assert_eq!(s.side_of(&Point3::new(2.0, 0.0, 0.0)), Side::Negative);
        assert_eq!(s.side_of(&Point3::new(3.5, 0.0, 0.0)), Side::Positive);
        // On the surface counts as positive
        assert_eq!(s.side_of(&Point3::new(3.0, 0.0, 0.0)), Side::Positive);
    }

    #[test]
    fn test_halfspace_bounds() {
        let s = Surface::sphere(6, 0.1).with_center(9.8, 0.0, 0.0);
        let b = s.halfspace_bounds(Side::Negative);
        assert!((b.min.x - 9.7).abs() < 1e-12);
        assert!((b.max.x - 9.9).abs() < 1e-12);
        assert!((b.max.z - 0.1).abs() < 1e-12);
        assert!(!s.halfspace_bounds(Side::Positive).is_finite());

        let p = Surface::x_plane(2, 3.0);
        assert_eq!(p.halfspace_bounds(Side::Negative).max.x, 3.0);
        assert_eq!(p.halfspace_bounds(Side::Positive).min.x, 3.0);

        let c = Surface::z_cylinder(3, 1.0, 2.0, 0.5);
        let cb = c.halfspace_bounds(Side::Negative);
        assert_eq!(cb.min.y, 1.5);
        assert!(cb.max.z.is_infinite());
    }

    #[test]
    fn test_validate() {
        assert!(Surface::sphere(1, 1.0).validate().is_ok());
        assert!(Surface::sphere(1, 0.0).validate().is_err());
        assert!(Surface::z_plane(2, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_serde_shape() {
        let s = Surface::sphere(1, 10.0).with_boundary(BoundaryType::Vacuum);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "sphere");
        assert_eq!(json["r"], 10.0);
        assert_eq!(json["boundary"], "vacuum");
        let back: Surface = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);

        let plane: Surface =
            serde_json::from_str(r#"{"id": 4, "type": "x-plane", "x0": 1.5}"#).unwrap();
        assert_eq!(plane.kind, SurfaceKind::XPlane { x0: 1.5 });
        assert_eq!(plane.boundary, BoundaryType::Transmission);
    }

    #[test]
    fn test_neg_builds_negative_halfspace() {
        let s = Surface::sphere(5, 0.01);
        assert_eq!(-&s, Region::halfspace(5, Side::Negative));
        assert_eq!(s.positive().to_string(), "+5");
    }
}
