//! Running sums shared by both estimators.

use crate::result::Estimate;

/// Per-cell and per-domain sums over a set of samples.
///
/// Each sample contributes a fraction `f` in `[0, 1]` to every domain: the
/// indicator of the located cell for point sampling, the share of the chord
/// for ray sampling.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tally {
    pub samples: u64,
    pub cell_sum: Vec<f64>,
    pub domain_sum: Vec<f64>,
    pub domain_sum_sq: Vec<f64>,
}

impl Tally {
    pub fn new(cells: usize, domains: usize) -> Self {
        Self {
            samples: 0,
            cell_sum: vec![0.0; cells],
            domain_sum: vec![0.0; domains],
            domain_sum_sq: vec![0.0; domains],
        }
    }

    /// Close one sample whose per-domain fractions are in `fractions`,
    /// resetting them to zero for the next sample.
    #[inline]
    pub fn record(&mut self, fractions: &mut [f64]) {
        self.samples += 1;
        for (d, f) in fractions.iter_mut().enumerate() {
            if *f != 0.0 {
                self.domain_sum[d] += *f;
                self.domain_sum_sq[d] += *f * *f;
                *f = 0.0;
            }
        }
    }

    pub fn merge(&mut self, other: &Tally) {
        self.samples += other.samples;
        for (a, b) in self.cell_sum.iter_mut().zip(&other.cell_sum) {
            *a += b;
        }
        for (a, b) in self.domain_sum.iter_mut().zip(&other.domain_sum) {
            *a += b;
        }
        for (a, b) in self.domain_sum_sq.iter_mut().zip(&other.domain_sum_sq) {
            *a += b;
        }
    }

    /// Volume estimate of domain `d` inside a box of volume `box_volume`.
    pub fn domain_estimate(&self, d: usize, box_volume: f64) -> Estimate {
        if self.samples == 0 {
            return Estimate::default();
        }
        let n = self.samples as f64;
        let mean = self.domain_sum[d] / n;
        let mean_sq = self.domain_sum_sq[d] / n;
        let std_dev = if self.samples > 1 {
            box_volume * ((mean_sq - mean * mean).max(0.0) / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Estimate::new(mean * box_volume, std_dev)
    }

    /// Mean volume of cell `c`.
    pub fn cell_volume(&self, c: usize, box_volume: f64) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.cell_sum[c] / self.samples as f64 * box_volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_statistics() {
        // 4 hits out of 10 in a box of volume 2.
        let mut tally = Tally::new(1, 1);
        for i in 0..10 {
            let mut f = [if i < 4 { 1.0 } else { 0.0 }];
            tally.record(&mut f);
            assert_eq!(f[0], 0.0);
        }
        let e = tally.domain_estimate(0, 2.0);
        assert!((e.mean - 0.8).abs() < 1e-12);
        let expected = 2.0 * ((0.4 - 0.16) / 9.0f64).sqrt();
        assert!((e.std_dev - expected).abs() < 1e-12);
    }

    #[test]
    fn test_fractional_statistics() {
        let mut tally = Tally::new(0, 1);
        for f in [0.5, 0.5] {
            tally.record(&mut [f]);
        }
        let e = tally.domain_estimate(0, 1.0);
        assert!((e.mean - 0.5).abs() < 1e-12);
        assert!(e.std_dev.abs() < 1e-12);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let values = [1.0, 0.0, 0.25, 0.75, 1.0, 0.0];
        let mut whole = Tally::new(0, 1);
        for v in values {
            whole.record(&mut [v]);
        }
        let mut left = Tally::new(0, 1);
        let mut right = Tally::new(0, 1);
        for v in &values[..2] {
            left.record(&mut [*v]);
        }
        for v in &values[2..] {
            right.record(&mut [*v]);
        }
        left.merge(&right);
        assert_eq!(left.samples, whole.samples);
        let (a, b) = (left.domain_estimate(0, 3.0), whole.domain_estimate(0, 3.0));
        assert!((a.mean - b.mean).abs() < 1e-12);
        assert!((a.std_dev - b.std_dev).abs() < 1e-12);
    }

    #[test]
    fn test_empty_and_single_sample() {
        let mut tally = Tally::new(1, 1);
        assert_eq!(tally.domain_estimate(0, 5.0), Estimate::default());
        assert_eq!(tally.cell_volume(0, 5.0), 0.0);
        tally.record(&mut [1.0]);
        assert_eq!(tally.domain_estimate(0, 5.0).std_dev, 0.0);
    }
}
