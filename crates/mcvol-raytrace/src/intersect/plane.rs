//! Ray-plane intersection for axis-aligned planes.

use crate::Ray;

/// Intersect a ray with the plane `coord[axis] = offset`.
///
/// Returns `None` if the ray is parallel to the plane or intersects behind
/// the origin.
pub fn intersect_axis_plane(ray: &Ray, axis: usize, offset: f64) -> Option<f64> {
    let denom = ray.direction[axis];
    if denom.abs() < 1e-12 {
        return None;
    }

    let t = (offset - ray.origin[axis]) / denom;
    if t < 0.0 {
        return None;
    }
    Some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcvol_math::{Point3, Vec3};

    #[test]
    fn test_ray_plane_perpendicular() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let t = intersect_axis_plane(&ray, 2, 0.0).unwrap();
        assert!((t - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_plane_oblique() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let t = intersect_axis_plane(&ray, 0, 2.0).unwrap();
        assert!((t - 2.0 * 2f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_ray_plane_parallel() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(intersect_axis_plane(&ray, 2, 0.0).is_none());
    }

    #[test]
    fn test_ray_plane_behind() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(intersect_axis_plane(&ray, 2, 0.0).is_none());
    }
}
