//! Ray-cylinder intersection (quadratic equation).

use super::quadratic_roots;
use crate::Ray;

/// Intersect a ray with an infinite cylinder parallel to z.
///
/// Returns up to 2 intersections (entry and exit points), sorted by t.
/// Only intersections with t >= 0 are returned.
pub fn intersect_z_cylinder(ray: &Ray, x0: f64, y0: f64, radius: f64) -> Vec<f64> {
    let (dx, dy) = (ray.direction.x, ray.direction.y);
    let (ox, oy) = (ray.origin.x - x0, ray.origin.y - y0);

    // Only the components perpendicular to the axis matter.
    let a = dx * dx + dy * dy;
    if a.abs() < 1e-12 {
        return Vec::new();
    }
    let b = 2.0 * (ox * dx + oy * dy);
    let c = ox * ox + oy * oy - radius * radius;

    quadratic_roots(a, b, c)
}
