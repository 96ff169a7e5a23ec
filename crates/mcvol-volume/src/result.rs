//! Volume calculation results.

use std::fs;
use std::path::Path;

use mcvol_ir::{DomainType, Estimator, Model, Trigger, TriggerMetric};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A mean with its standard deviation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Sample mean.
    pub mean: f64,
    /// Standard deviation of the mean.
    pub std_dev: f64,
}

impl Estimate {
    /// Create an estimate.
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// Relative error `σ / mean`; infinite for a zero mean.
    pub fn rel_err(&self) -> f64 {
        if self.mean == 0.0 {
            f64::INFINITY
        } else {
            self.std_dev / self.mean.abs()
        }
    }

    /// Variance of the mean.
    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }

    /// Value of a trigger metric.
    pub fn metric(&self, metric: TriggerMetric) -> f64 {
        match metric {
            TriggerMetric::StdDev => self.std_dev,
            TriggerMetric::RelErr => self.rel_err(),
            TriggerMetric::Variance => self.variance(),
        }
    }

    /// Whether the estimate satisfies `trigger`.
    pub fn meets(&self, trigger: &Trigger) -> bool {
        self.metric(trigger.metric) <= trigger.threshold
    }
}

/// Number of atoms of one nuclide in a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuclideAtoms {
    /// Nuclide name.
    pub nuclide: String,
    /// Atom count.
    pub atoms: Estimate,
}

/// Estimated volume of one requested domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainVolume {
    /// Domain id.
    pub id: u32,
    /// Volume in cm³.
    pub volume: Estimate,
    /// Atoms per nuclide, in first-appearance order over the domain's materials.
    #[serde(default)]
    pub atoms: Vec<NuclideAtoms>,
}

/// Outcome of one volume calculation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeResult {
    /// Kind of domains estimated.
    pub domain_type: DomainType,
    /// Sampling strategy.
    pub method: Estimator,
    /// Samples per iteration.
    pub samples: u64,
    /// Iterations performed (1 without a trigger).
    pub iterations: u32,
    /// Sampling box lower corner.
    pub lower_left: [f64; 3],
    /// Sampling box upper corner.
    pub upper_right: [f64; 3],
    /// Trigger the calculation ran against.
    #[serde(default)]
    pub threshold: Option<Trigger>,
    /// One entry per requested domain, in request order.
    pub domains: Vec<DomainVolume>,
}

impl VolumeResult {
    /// Total number of samples drawn.
    pub fn total_samples(&self) -> u64 {
        self.samples * u64::from(self.iterations)
    }

    /// Result for domain `id`.
    pub fn domain(&self, id: u32) -> Option<&DomainVolume> {
        self.domains.iter().find(|d| d.id == id)
    }

    /// Store the mean volumes on the matching cells or materials of `model`.
    ///
    /// Universe results have nowhere to go and are skipped.
    pub fn apply_to_model(&self, model: &mut Model) {
        for domain in &self.domains {
            let slot = match self.domain_type {
                DomainType::Cell => model.geometry.cell_mut(domain.id).map(|c| &mut c.volume),
                DomainType::Material => model.material_mut(domain.id).map(|m| &mut m.volume),
                DomainType::Universe => None,
            };
            match slot {
                Some(volume) => *volume = Some(domain.volume.mean),
                None => log::debug!(
                    "no {} {} to store a volume on",
                    self.domain_type.as_str(),
                    domain.id
                ),
            }
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the result as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a result written by [`VolumeResult::save`].
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
