//! Running volume calculation requests.

use mcvol_ir::{Fill, Model, VolumeCalculation};
use mcvol_raytrace::GeometryIndex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::domain::DomainMap;
use crate::error::{Result, VolumeError};
use crate::options::VolumeOptions;
use crate::result::{DomainVolume, Estimate, NuclideAtoms, VolumeResult};
use crate::sampler::Sampler;
use crate::tally::Tally;

/// Barns per cm².
const BARN_CM2: f64 = 1e24;

/// Batches tallied in parallel before merging into the running sums.
const MERGE_WINDOW: u64 = 1024;

/// A validated model ready to run volume calculations.
pub struct VolumeEngine<'m> {
    model: &'m Model,
    index: GeometryIndex,
    options: VolumeOptions,
    pool: Option<ThreadPool>,
}

impl<'m> VolumeEngine<'m> {
    /// Validate `model` and `options` and compile the geometry.
    pub fn new(model: &'m Model, options: VolumeOptions) -> Result<Self> {
        options.validate()?;
        model.validate()?;
        let index = GeometryIndex::build(&model.geometry)?;
        let pool = match options.threads {
            0 => None,
            n => Some(ThreadPoolBuilder::new().num_threads(n).build()?),
        };
        Ok(Self {
            model,
            index,
            options,
            pool,
        })
    }

    /// Run every request in the model's settings, in order.
    pub fn run_all(&self) -> Result<Vec<VolumeResult>> {
        let calcs = &self.model.settings.volume_calculations;
        if calcs.is_empty() {
            return Err(VolumeError::NoVolumeCalculations);
        }
        calcs.iter().map(|calc| self.run(calc)).collect()
    }

    /// Run one request.
    ///
    /// Every request starts from the configured seed, so two requests over
    /// the same box with the same method see identical samples.
    pub fn run(&self, calc: &VolumeCalculation) -> Result<VolumeResult> {
        calc.validate()?;
        let domains = DomainMap::resolve(calc, &self.index, &self.model.materials)?;
        let bounds = calc.bounds();
        let box_volume = bounds.volume();
        let max_iterations = match calc.trigger {
            Some(_) => self.options.max_iterations,
            None => 1,
        };
        let plan = self.options.batch_plan(calc.samples, max_iterations)?;

        log::info!(
            "volume calculation over {} {}(s) {:?}: {} {} samples in {} batches",
            calc.domain_ids.len(),
            calc.domain_type.as_str(),
            calc.domain_ids,
            calc.samples,
            calc.method.as_str(),
            plan.batches
        );

        let sampler = Sampler {
            index: &self.index,
            domains: &domains,
            bounds,
            method: calc.method,
        };

        let mut tally = Tally::new(self.index.cells().len(), domains.len());
        let mut iterations = 0u32;
        loop {
            let first_batch = u64::from(iterations) * plan.batches;
            let seed = self.options.seed;
            let mut start = 0;
            while start < plan.batches {
                let window = (plan.batches - start).min(MERGE_WINDOW) as usize;
                let batches: Vec<Tally> = self.in_pool(|| {
                    (0..window)
                        .into_par_iter()
                        .map(|i| {
                            let k = start + i as u64;
                            let mut rng =
                                StdRng::seed_from_u64(seed.wrapping_add(first_batch + k));
                            sampler.run(plan.size(k), &mut rng)
                        })
                        .collect()
                });
                // Merge in batch order so sums do not depend on scheduling.
                for batch in &batches {
                    tally.merge(batch);
                }
                start += window as u64;
            }
            iterations += 1;

            let Some(trigger) = &calc.trigger else { break };
            let estimates: Vec<Estimate> = (0..domains.len())
                .map(|d| tally.domain_estimate(d, box_volume))
                .collect();
            if estimates.iter().all(|e| e.meets(trigger)) {
                log::debug!("trigger met after {iterations} iteration(s)");
                break;
            }
            if iterations >= self.options.max_iterations {
                log::warn!(
                    "trigger {} <= {} not met after {} iterations; stopping",
                    trigger.metric.as_str(),
                    trigger.threshold,
                    iterations
                );
                break;
            }
            log::debug!(
                "iteration {iterations}: worst {} = {:e}",
                trigger.metric.as_str(),
                estimates
                    .iter()
                    .map(|e| e.metric(trigger.metric))
                    .fold(0.0, f64::max)
            );
        }

        let mut results = Vec::with_capacity(domains.len());
        for (d, &id) in calc.domain_ids.iter().enumerate() {
            let volume = tally.domain_estimate(d, box_volume);
            let atoms = self.domain_atoms(&domains.cells_of(d), &tally, box_volume, &volume)?;
            results.push(DomainVolume { id, volume, atoms });
        }

        log::info!(
            "volume calculation finished after {} sample(s)",
            tally.samples
        );

        Ok(VolumeResult {
            domain_type: calc.domain_type,
            method: calc.method,
            samples: calc.samples,
            iterations,
            lower_left: calc.lower_left,
            upper_right: calc.upper_right,
            threshold: calc.trigger,
            domains: results,
        })
    }

    fn in_pool<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Atoms per nuclide from each material's share of the domain volume.
    fn domain_atoms(
        &self,
        cells: &[usize],
        tally: &Tally,
        box_volume: f64,
        volume: &Estimate,
    ) -> Result<Vec<NuclideAtoms>> {
        let mut material_volumes: Vec<(u32, f64)> = Vec::new();
        for &c in cells {
            let Fill::Material(id) = self.index.cells()[c].fill else {
                continue;
            };
            let v = tally.cell_volume(c, box_volume);
            match material_volumes.iter_mut().find(|(m, _)| *m == id) {
                Some(entry) => entry.1 += v,
                None => material_volumes.push((id, v)),
            }
        }

        let rel_err = if volume.mean > 0.0 {
            volume.std_dev / volume.mean
        } else {
            0.0
        };

        let mut atoms: Vec<NuclideAtoms> = Vec::new();
        for (id, v) in material_volumes {
            let Some(material) = self.model.material(id) else {
                continue;
            };
            for (nuclide, density) in material.atom_densities()? {
                let count = v * density * BARN_CM2;
                match atoms.iter_mut().find(|a| a.nuclide == nuclide) {
                    Some(entry) => entry.atoms.mean += count,
                    None => atoms.push(NuclideAtoms {
                        nuclide,
                        atoms: Estimate::new(count, 0.0),
                    }),
                }
            }
        }
        for entry in &mut atoms {
            entry.atoms.std_dev = entry.atoms.mean * rel_err;
        }
        Ok(atoms)
    }
}

/// Run every volume calculation of `model`.
pub fn calculate_volumes(model: &Model, options: VolumeOptions) -> Result<Vec<VolumeResult>> {
    if model.settings.volume_calculations.is_empty() {
        return Err(VolumeError::NoVolumeCalculations);
    }
    VolumeEngine::new(model, options)?.run_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mcvol_ir::{
        Cell, DensityUnit, Estimator, Geometry, Material, PercentType, RunMode, Settings, Surface,
        TriggerMetric, Universe,
    };
    use mcvol_math::{sphere_volume, Aabb3};

    fn unit_box() -> Aabb3 {
        Aabb3::from_corners([-1.0; 3], [1.0; 3])
    }

    /// Unit sphere of material 1 inside a void shell out to r = 2.
    fn sphere_model(calcs: Vec<VolumeCalculation>) -> Model {
        let mut oxygen = Material::new(1);
        oxygen.add_nuclide("O16", 0.05, PercentType::Ao).unwrap();
        oxygen.set_density(DensityUnit::Sum, 0.0).unwrap();

        let inner = Surface::sphere(1, 1.0);
        let outer = Surface::sphere(2, 2.0);
        let cells = vec![
            Cell::new(1, Fill::Material(1), -&inner),
            Cell::new(2, Fill::Void, inner.positive() & -&outer),
        ];
        let geometry = Geometry::new(Universe::new(0, cells), vec![inner, outer]);
        let settings = Settings {
            run_mode: RunMode::Volume,
            volume_calculations: calcs,
        };
        Model::new(vec![oxygen], geometry, settings)
    }

    fn options() -> VolumeOptions {
        VolumeOptions {
            seed: 7,
            batch_size: 20_000,
            ..Default::default()
        }
    }

    fn within_five_sigma(e: &Estimate, reference: f64) -> bool {
        (e.mean - reference).abs() <= 5.0 * e.std_dev
    }

    #[test]
    fn test_point_estimate_of_unit_sphere() {
        let model = sphere_model(vec![VolumeCalculation::cells([1, 2], 100_000, &unit_box())]);
        let results = calculate_volumes(&model, options()).unwrap();
        let r = &results[0];
        assert_eq!(r.iterations, 1);
        assert_eq!(r.total_samples(), 100_000);

        let sphere = r.domain(1).unwrap().volume;
        assert!(within_five_sigma(&sphere, sphere_volume(1.0)), "{sphere:?}");
        assert!(sphere.std_dev > 0.0 && sphere.std_dev < 0.02);

        // Cells 1 and 2 tile the box.
        let shell = r.domain(2).unwrap().volume;
        assert_relative_eq!(sphere.mean + shell.mean, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ray_estimate_of_unit_sphere() {
        let calc = VolumeCalculation::cells([1], 40_000, &unit_box()).with_method(Estimator::Ray);
        let model = sphere_model(vec![calc]);
        let r = &calculate_volumes(&model, options()).unwrap()[0];
        let sphere = r.domain(1).unwrap().volume;
        assert!(within_five_sigma(&sphere, sphere_volume(1.0)), "{sphere:?}");
        assert!(sphere.std_dev > 0.0 && sphere.std_dev < 0.05);
    }

    #[test]
    fn test_results_independent_of_thread_count() {
        let calcs = vec![
            VolumeCalculation::cells([1, 2], 50_000, &unit_box()),
            VolumeCalculation::universes([0], 10_000, &unit_box()).with_method(Estimator::Ray),
        ];
        let model = sphere_model(calcs);
        let single = calculate_volumes(&model, options().with_threads(1)).unwrap();
        let several = calculate_volumes(&model, options().with_threads(3)).unwrap();
        assert_eq!(single, several);

        let reseeded = calculate_volumes(&model, options().with_seed(8)).unwrap();
        assert_ne!(single, reseeded);
    }

    #[test]
    fn test_same_seed_gives_matching_cell_and_material_volumes() {
        let calcs = vec![
            VolumeCalculation::cells([1], 10_000, &unit_box()),
            VolumeCalculation::materials([1], 10_000, &unit_box()),
        ];
        let model = sphere_model(calcs);
        let results = calculate_volumes(&model, options()).unwrap();
        assert_eq!(results[0].domains[0].volume, results[1].domains[0].volume);
    }

    #[test]
    fn test_atoms_follow_volume() {
        let model = sphere_model(vec![VolumeCalculation::materials([1], 10_000, &unit_box())]);
        let r = &calculate_volumes(&model, options()).unwrap()[0];
        let domain = &r.domains[0];
        assert_eq!(domain.atoms.len(), 1);
        let oxygen = &domain.atoms[0];
        assert_eq!(oxygen.nuclide, "O16");
        assert_relative_eq!(oxygen.atoms.mean, domain.volume.mean * 0.05e24, max_relative = 1e-12);
        assert_relative_eq!(
            oxygen.atoms.std_dev / oxygen.atoms.mean,
            domain.volume.rel_err(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_universe_has_no_atoms_from_void() {
        let model = sphere_model(vec![VolumeCalculation::universes([0], 5_000, &unit_box())]);
        let r = &calculate_volumes(&model, options()).unwrap()[0];
        // The box lies entirely inside the universe.
        assert_relative_eq!(r.domains[0].volume.mean, 8.0, epsilon = 1e-9);
        assert_eq!(r.domains[0].volume.std_dev, 0.0);
        assert_eq!(r.domains[0].atoms.len(), 1);
    }

    #[test]
    fn test_trigger_repeats_until_met() {
        let calc = VolumeCalculation::cells([1], 1_000, &unit_box())
            .with_trigger(TriggerMetric::RelErr, 0.01);
        let model = sphere_model(vec![calc]);
        let r = &calculate_volumes(&model, options()).unwrap()[0];
        assert!(r.iterations > 1);
        assert!(r.domains[0].volume.rel_err() <= 0.01);
        assert_eq!(r.total_samples(), 1_000 * u64::from(r.iterations));
    }

    #[test]
    fn test_trigger_iteration_cap() {
        let calc = VolumeCalculation::cells([1], 100, &unit_box())
            .with_trigger(TriggerMetric::StdDev, 1e-12);
        let model = sphere_model(vec![calc]);
        let options = VolumeOptions {
            max_iterations: 3,
            ..options()
        };
        let r = &calculate_volumes(&model, options).unwrap()[0];
        assert_eq!(r.iterations, 3);
    }

    #[test]
    fn test_many_batches_merge_across_windows() {
        let model = sphere_model(vec![VolumeCalculation::cells([1], 25_005, &unit_box())]);
        let small = VolumeOptions {
            batch_size: 10,
            ..options()
        };
        let single = calculate_volumes(&model, small.clone().with_threads(1)).unwrap();
        let several = calculate_volumes(&model, small.with_threads(3)).unwrap();
        assert_eq!(single, several);
        assert_eq!(single[0].total_samples(), 25_005);
    }

    #[test]
    fn test_oversized_request_is_rejected_before_sampling() {
        let calc = VolumeCalculation::universes([0], u64::MAX / 2, &unit_box())
            .with_trigger(TriggerMetric::RelErr, 1e-3);
        let model = sphere_model(vec![calc]);
        assert!(matches!(
            calculate_volumes(&model, options()),
            Err(VolumeError::Model(mcvol_ir::IrError::InvalidVolumeCalc(_)))
        ));
    }

    #[test]
    fn test_request_errors() {
        let model = sphere_model(vec![]);
        assert!(matches!(
            calculate_volumes(&model, options()),
            Err(VolumeError::NoVolumeCalculations)
        ));

        let model = sphere_model(vec![VolumeCalculation::materials([5], 10, &unit_box())]);
        assert!(matches!(
            calculate_volumes(&model, options()),
            Err(VolumeError::UnknownDomain { kind: "material", id: 5 })
        ));

        let mut calc = VolumeCalculation::cells([1], 10, &unit_box());
        calc.upper_right = [f64::INFINITY, 1.0, 1.0];
        let model = sphere_model(vec![calc]);
        assert!(matches!(
            calculate_volumes(&model, options()),
            Err(VolumeError::Model(_))
        ));
    }
}
