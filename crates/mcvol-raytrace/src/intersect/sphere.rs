//! Ray-sphere intersection (quadratic equation).

use mcvol_math::Point3;

use super::quadratic_roots;
use crate::Ray;

/// Intersect a ray with a sphere.
///
/// Returns up to 2 intersections (entry and exit points), sorted by t.
/// Only intersections with t >= 0 are returned.
pub fn intersect_sphere(ray: &Ray, center: &Point3, radius: f64) -> Vec<f64> {
    let oc = ray.origin - center;
    let d = ray.direction.as_ref();

    // |oc + t*d|^2 = r^2
    let a = d.dot(d);
    let b = 2.0 * oc.dot(d);
    let c = oc.dot(&oc) - radius * radius;

    quadratic_roots(a, b, c)
}
