//! Point and ray estimators.

use mcvol_ir::Estimator;
use mcvol_math::Aabb3;
use mcvol_raytrace::{GeometryIndex, Ray};
use rand::rngs::StdRng;
use rand::Rng;

use crate::domain::DomainMap;
use crate::tally::Tally;

/// Draws samples for one request and tallies them.
pub(crate) struct Sampler<'a> {
    pub index: &'a GeometryIndex,
    pub domains: &'a DomainMap,
    pub bounds: Aabb3,
    pub method: Estimator,
}

impl Sampler<'_> {
    /// Tally `n` samples drawn from `rng`.
    pub fn run(&self, n: u64, rng: &mut StdRng) -> Tally {
        match self.method {
            Estimator::Point => self.points(n, rng),
            Estimator::Ray => self.rays(n, rng),
        }
    }

    fn new_tally(&self) -> (Tally, Vec<f64>) {
        (
            Tally::new(self.index.cells().len(), self.domains.len()),
            vec![0.0; self.domains.len()],
        )
    }

    /// Uniform points in the box; each scores 1 in the domains of its cell.
    fn points(&self, n: u64, rng: &mut StdRng) -> Tally {
        let (mut tally, mut f) = self.new_tally();
        for _ in 0..n {
            let p = self.bounds.lerp([rng.gen(), rng.gen(), rng.gen()]);
            if let Some(c) = self.index.find_cell(&p) {
                tally.cell_sum[c] += 1.0;
                for &d in self.domains.domains_of(c) {
                    f[d] += 1.0;
                }
            }
            tally.record(&mut f);
        }
        tally
    }

    /// Isotropic lines through uniform points; each scores the fraction of
    /// its chord through the box that lies in each domain.
    fn rays(&self, n: u64, rng: &mut StdRng) -> Tally {
        let (mut tally, mut f) = self.new_tally();
        let mut segments = Vec::new();
        for _ in 0..n {
            let origin = self.bounds.lerp([rng.gen(), rng.gen(), rng.gen()]);
            let ray = Ray::isotropic(origin, rng.gen(), rng.gen());

            segments.clear();
            if let Some(length) = self.index.trace_chord(&ray, &self.bounds, &mut segments) {
                for segment in &segments {
                    let Some(c) = segment.cell else { continue };
                    let share = segment.length / length;
                    tally.cell_sum[c] += share;
                    for &d in self.domains.domains_of(c) {
                        f[d] += share;
                    }
                }
            }
            tally.record(&mut f);
        }
        tally
    }
}
