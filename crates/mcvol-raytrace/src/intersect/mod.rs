//! Ray-surface intersection.
//!
//! Each surface family has a closed-form intersector returning the ray
//! parameters of its crossings, ascending and restricted to `t >= 0`.

mod cylinder;
mod plane;
mod sphere;

pub use cylinder::intersect_z_cylinder;
pub use plane::intersect_axis_plane;
pub use sphere::intersect_sphere;

use mcvol_ir::{Surface, SurfaceKind};
use mcvol_math::Point3;

use crate::Ray;

/// Intersect a ray with a surface, returning crossing parameters sorted by t.
pub fn intersect_surface(ray: &Ray, surface: &Surface) -> Vec<f64> {
    match surface.kind {
        SurfaceKind::Sphere { x0, y0, z0, r } => {
            intersect_sphere(ray, &Point3::new(x0, y0, z0), r)
        }
        SurfaceKind::XPlane { x0 } => intersect_axis_plane(ray, 0, x0).into_iter().collect(),
        SurfaceKind::YPlane { y0 } => intersect_axis_plane(ray, 1, y0).into_iter().collect(),
        SurfaceKind::ZPlane { z0 } => intersect_axis_plane(ray, 2, z0).into_iter().collect(),
        SurfaceKind::ZCylinder { x0, y0, r } => intersect_z_cylinder(ray, x0, y0, r),
    }
}

/// Both roots of `a t² + b t + c = 0` that are non-negative, ascending.
pub(crate) fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    [t1, t2].into_iter().filter(|t| *t >= 0.0).collect()
}
