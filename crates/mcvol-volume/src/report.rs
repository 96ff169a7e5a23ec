//! Comparing estimates with known volumes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::result::{Estimate, VolumeResult};

/// An estimate next to its reference value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Domain id.
    pub id: u32,
    /// Estimated volume.
    pub estimate: Estimate,
    /// Known volume.
    pub reference: f64,
    /// `(estimate - reference) / reference`.
    pub rel_diff: f64,
    /// `(estimate - reference) / σ`.
    pub z_score: f64,
}

impl Comparison {
    /// Compare one estimate with its reference.
    ///
    /// Zero denominators give zero when the difference is zero and a signed
    /// infinity otherwise.
    pub fn new(id: u32, estimate: Estimate, reference: f64) -> Self {
        let diff = estimate.mean - reference;
        Self {
            id,
            estimate,
            reference,
            rel_diff: ratio(diff, reference.abs()),
            z_score: ratio(diff, estimate.std_dev),
        }
    }

    /// Whether the estimate lies within `sigmas` standard deviations.
    pub fn within(&self, sigmas: f64) -> bool {
        self.z_score.abs() <= sigmas
    }
}

fn ratio(diff: f64, scale: f64) -> f64 {
    if scale > 0.0 {
        diff / scale
    } else if diff == 0.0 {
        0.0
    } else {
        f64::INFINITY.copysign(diff)
    }
}

/// Compare every domain of `result` that has an entry in `references`.
pub fn compare(result: &VolumeResult, references: &HashMap<u32, f64>) -> Vec<Comparison> {
    result
        .domains
        .iter()
        .filter_map(|d| {
            references
                .get(&d.id)
                .map(|&reference| Comparison::new(d.id, d.volume, reference))
        })
        .collect()
}
