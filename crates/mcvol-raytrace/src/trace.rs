//! Splitting a line through the sampling box into per-cell segments.

use mcvol_math::Aabb3;

use crate::intersect::intersect_surface;
use crate::{GeometryIndex, Ray};

/// A piece of a chord lying in a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Index into [`GeometryIndex::cells`], `None` outside every cell.
    pub cell: Option<usize>,
    /// Segment length.
    pub length: f64,
}

impl GeometryIndex {
    /// Trace the full chord of `ray`'s line through `bounds`.
    ///
    /// The chord extends in both directions from the ray origin. It is cut at
    /// every surface crossing and each piece is located by its midpoint.
    /// Segments are appended to `segments` in order along the direction.
    /// Returns the chord length, or `None` when the line misses the box.
    pub fn trace_chord(
        &self,
        ray: &Ray,
        bounds: &Aabb3,
        segments: &mut Vec<Segment>,
    ) -> Option<f64> {
        let (t_enter, t_exit) = ray.chord_aabb(bounds)?;
        let length = t_exit - t_enter;
        if !(length > 0.0) {
            return None;
        }
        let entry = ray.advanced(t_enter);

        let mut cuts = vec![0.0, length];
        for surface in self.surfaces() {
            cuts.extend(
                intersect_surface(&entry, surface)
                    .into_iter()
                    .filter(|t| *t > 0.0 && *t < length),
            );
        }
        cuts.sort_by(f64::total_cmp);

        for pair in cuts.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if b <= a {
                continue;
            }
            let mid = entry.at(0.5 * (a + b));
            segments.push(Segment {
                cell: self.find_cell(&mid),
                length: b - a,
            });
        }
        Some(length)
    }
}
