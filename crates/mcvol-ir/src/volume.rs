//! Stochastic volume calculation requests and run settings.

use mcvol_math::Aabb3;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, Result};

/// Kind of entity whose volume is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    /// Cells, by id.
    Cell,
    /// Materials, by id (all cells filled with the material).
    Material,
    /// Universes, by id (all cells of the universe).
    Universe,
}

impl DomainType {
    /// Name used in the XML descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainType::Cell => "cell",
            DomainType::Material => "material",
            DomainType::Universe => "universe",
        }
    }
}

/// Sampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Estimator {
    /// Uniform point sampling; hit fraction times box volume.
    #[default]
    Point,
    /// Random chords through the box; track-length fraction times box volume.
    Ray,
}

impl Estimator {
    /// Name used in the XML descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Estimator::Point => "point",
            Estimator::Ray => "ray",
        }
    }
}

/// Uncertainty measure a trigger checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMetric {
    /// Standard deviation of the volume (cm³).
    StdDev,
    /// Standard deviation over mean.
    RelErr,
    /// Variance of the volume (cm⁶).
    Variance,
}

impl TriggerMetric {
    /// Name used in the XML descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMetric::StdDev => "std_dev",
            TriggerMetric::RelErr => "rel_err",
            TriggerMetric::Variance => "variance",
        }
    }
}

/// Convergence criterion applied to every domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// What is measured.
    pub metric: TriggerMetric,
    /// Upper bound the measure must fall under.
    pub threshold: f64,
}

/// One stochastic volume calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeCalculation {
    /// Kind of domains.
    pub domain_type: DomainType,
    /// Domain ids, in result order.
    pub domain_ids: Vec<u32>,
    /// Samples per iteration.
    pub samples: u64,
    /// Lower-left corner of the sampling box.
    pub lower_left: [f64; 3],
    /// Upper-right corner of the sampling box.
    pub upper_right: [f64; 3],
    /// Sampling strategy.
    #[serde(default)]
    pub method: Estimator,
    /// Optional convergence trigger.
    #[serde(default)]
    pub trigger: Option<Trigger>,
}

impl VolumeCalculation {
    /// Request over explicit domains and bounds.
    pub fn new(
        domain_type: DomainType,
        domain_ids: Vec<u32>,
        samples: u64,
        bounds: &Aabb3,
    ) -> Self {
        let (lower_left, upper_right) = bounds.corners();
        Self {
            domain_type,
            domain_ids,
            samples,
            lower_left,
            upper_right,
            method: Estimator::Point,
            trigger: None,
        }
    }

    /// Request over cells.
    pub fn cells(ids: impl IntoIterator<Item = u32>, samples: u64, bounds: &Aabb3) -> Self {
        Self::new(DomainType::Cell, ids.into_iter().collect(), samples, bounds)
    }

    /// Request over materials.
    pub fn materials(ids: impl IntoIterator<Item = u32>, samples: u64, bounds: &Aabb3) -> Self {
        Self::new(DomainType::Material, ids.into_iter().collect(), samples, bounds)
    }

    /// Request over universes.
    pub fn universes(ids: impl IntoIterator<Item = u32>, samples: u64, bounds: &Aabb3) -> Self {
        Self::new(DomainType::Universe, ids.into_iter().collect(), samples, bounds)
    }

    /// Select the sampling strategy.
    pub fn with_method(mut self, method: Estimator) -> Self {
        self.method = method;
        self
    }

    /// Repeat until every domain meets `threshold` for `metric`.
    pub fn with_trigger(mut self, metric: TriggerMetric, threshold: f64) -> Self {
        self.trigger = Some(Trigger { metric, threshold });
        self
    }

    /// Sampling box.
    pub fn bounds(&self) -> Aabb3 {
        Aabb3::from_corners(self.lower_left, self.upper_right)
    }

    /// Check the request is well formed (domain existence is checked by the engine).
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(IrError::InvalidVolumeCalc(msg));
        if self.domain_ids.is_empty() {
            return invalid("no domains given".into());
        }
        if self.samples == 0 {
            return invalid("number of samples must be positive".into());
        }
        for axis in 0..3 {
            let (lo, hi) = (self.lower_left[axis], self.upper_right[axis]);
            if !lo.is_finite() || !hi.is_finite() {
                return invalid(format!("bounds must be finite, got {lo}..{hi}"));
            }
            if lo >= hi {
                return invalid(format!(
                    "lower_left must be below upper_right on every axis ({lo} >= {hi})"
                ));
            }
        }
        if let Some(trigger) = &self.trigger {
            if !(trigger.threshold > 0.0) {
                return invalid(format!(
                    "trigger threshold {} must be positive",
                    trigger.threshold
                ));
            }
        }
        Ok(())
    }
}

/// What the engine is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunMode {
    /// k-eigenvalue transport (not performed by mcvol).
    #[default]
    #[serde(rename = "eigenvalue")]
    Eigenvalue,
    /// Fixed-source transport (not performed by mcvol).
    #[serde(rename = "fixed source")]
    FixedSource,
    /// Stochastic volume calculation.
    #[serde(rename = "volume")]
    Volume,
}

impl RunMode {
    /// Name used in the XML descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Eigenvalue => "eigenvalue",
            RunMode::FixedSource => "fixed source",
            RunMode::Volume => "volume",
        }
    }
}

/// Run settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Run mode.
    #[serde(default)]
    pub run_mode: RunMode,
    /// Volume calculations, executed in order.
    #[serde(default)]
    pub volume_calculations: Vec<VolumeCalculation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Aabb3 {
        Aabb3::from_corners([-10.0; 3], [10.0; 3])
    }

    #[test]
    fn test_builders() {
        let calc = VolumeCalculation::cells([1, 2, 3], 1000, &cube())
            .with_method(Estimator::Ray)
            .with_trigger(TriggerMetric::RelErr, 0.01);
        assert_eq!(calc.domain_type, DomainType::Cell);
        assert_eq!(calc.domain_ids, vec![1, 2, 3]);
        assert_eq!(calc.lower_left, [-10.0; 3]);
        assert_eq!(calc.bounds().volume(), 8000.0);
        assert!(calc.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_requests() {
        let ok = VolumeCalculation::materials([1], 10, &cube());
        assert!(ok.validate().is_ok());

        let mut c = ok.clone();
        c.domain_ids.clear();
        assert!(c.validate().is_err());

        let mut c = ok.clone();
        c.samples = 0;
        assert!(c.validate().is_err());

        let mut c = ok.clone();
        c.upper_right[1] = -10.0;
        assert!(c.validate().is_err());

        let c = VolumeCalculation::universes([0], 10, &Aabb3::infinite());
        assert!(c.validate().is_err());

        let c = ok.with_trigger(TriggerMetric::StdDev, 0.0);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_serde_names() {
        let calc = VolumeCalculation::universes([0], 5, &cube())
            .with_trigger(TriggerMetric::StdDev, 1.0);
        let json = serde_json::to_value(&calc).unwrap();
        assert_eq!(json["domain_type"], "universe");
        assert_eq!(json["method"], "point");
        assert_eq!(json["trigger"]["metric"], "std_dev");

        let settings = Settings {
            run_mode: RunMode::FixedSource,
            volume_calculations: vec![],
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["run_mode"], "fixed source");
    }
}
