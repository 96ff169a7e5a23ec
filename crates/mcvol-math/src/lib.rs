#![warn(missing_docs)]

//! Math types for the mcvol volume engine.
//!
//! Thin wrappers around nalgebra providing the point, vector and direction
//! types used by the geometry and sampling crates, plus tolerance constants
//! and the axis-aligned box that bounds every sampling domain.

use nalgebra::{Unit, Vector3};
use std::f64::consts::PI;

/// A point in 3D space (cm).
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Volume of a sphere of radius `r`: (4/3)·π·r³.
#[inline]
pub fn sphere_volume(r: f64) -> f64 {
    4.0 * PI / 3.0 * r.powi(3)
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in cm.
    pub linear: f64,
    /// Relative tolerance for volume comparisons.
    pub relative: f64,
}

impl Tolerance {
    /// Default tolerances (1e-10 cm linear, 1e-12 relative).
    pub const DEFAULT: Self = Self {
        linear: 1e-10,
        relative: 1e-12,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if two volumes agree to the relative tolerance.
    pub fn volumes_equal(&self, a: f64, b: f64) -> bool {
        let scale = a.abs().max(b.abs()).max(f64::MIN_POSITIVE);
        (a - b).abs() <= self.relative * scale
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Axis-aligned bounding box in 3D.
///
/// Unbounded directions are represented with infinite coordinates, so the
/// half-space of a sphere's exterior is simply [`Aabb3::infinite`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from `[x, y, z]` corner arrays.
    pub fn from_corners(lower_left: [f64; 3], upper_right: [f64; 3]) -> Self {
        Self {
            min: Point3::new(lower_left[0], lower_left[1], lower_left[2]),
            max: Point3::new(upper_right[0], upper_right[1], upper_right[2]),
        }
    }

    /// Cube of half-width `r` centered on `center`.
    pub fn around(center: &Point3, r: f64) -> Self {
        Self {
            min: Point3::new(center.x - r, center.y - r, center.z - r),
            max: Point3::new(center.x + r, center.y + r, center.z + r),
        }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// The whole of space.
    pub fn infinite() -> Self {
        Self {
            min: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            max: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
        }
    }

    /// Corners as `([x, y, z], [x, y, z])`.
    pub fn corners(&self) -> ([f64; 3], [f64; 3]) {
        (
            [self.min.x, self.min.y, self.min.z],
            [self.max.x, self.max.y, self.max.z],
        )
    }

    /// True when no min coordinate exceeds its max.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// True when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.min.coords.iter().chain(self.max.coords.iter()).all(|c| c.is_finite())
    }

    /// Edge lengths along x, y and z.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Volume enclosed by the box; zero for empty boxes.
    pub fn volume(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Aabb3) -> Aabb3 {
        Aabb3 {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Overlap of both boxes (possibly empty).
    pub fn intersection(&self, other: &Aabb3) -> Aabb3 {
        Aabb3 {
            min: Point3::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            max: Point3::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        }
    }

    /// Test whether a point lies inside the box (boundary inclusive).
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Map unit-cube coordinates `u ∈ [0,1)³` into the box.
    #[inline]
    pub fn lerp(&self, u: [f64; 3]) -> Point3 {
        let s = self.size();
        Point3::new(
            self.min.x + u[0] * s.x,
            self.min.y + u[1] * s.y,
            self.min.z + u[2] * s.z,
        )
    }
}
