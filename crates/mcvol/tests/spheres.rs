use mcvol::ir::{DomainType, Estimator};
use mcvol::math::Tolerance;
use mcvol::spheres::{self, Radii, ReferenceVolumes, WATER};
use mcvol::{compare, VolumeEngine, VolumeOptions, VolumeResult};
use std::f64::consts::PI;

fn options() -> VolumeOptions {
    VolumeOptions {
        seed: 12345,
        batch_size: 25_000,
        ..Default::default()
    }
}

fn reference() -> anyhow::Result<ReferenceVolumes> {
    Ok(ReferenceVolumes::new(Radii::default())?)
}

/// Run request `i` of the benchmark scaled by `scale`.
fn run_request(scale: f64, i: usize, options: VolumeOptions) -> anyhow::Result<VolumeResult> {
    let model = spheres::model(scale)?;
    let engine = VolumeEngine::new(&model, options)?;
    Ok(engine.run(&model.settings.volume_calculations[i])?)
}

/// The six cells partition the outer sphere exactly.
#[test]
fn reference_volumes_partition_the_ball() -> anyhow::Result<()> {
    let reference = reference()?;
    let ball = 4.0 / 3.0 * PI * 10f64.powi(3);
    assert!(Tolerance::DEFAULT.volumes_equal(reference.total(), ball));
    assert!(reference.cells().iter().all(|v| *v >= 0.0));
    Ok(())
}

/// The bounding box of the benchmark is the outer sphere's box.
#[test]
fn benchmark_bounding_box() -> anyhow::Result<()> {
    let model = spheres::model(1.0)?;
    let b = model.geometry.bounding_box()?;
    assert_eq!(b.corners(), ([-10.0; 3], [10.0; 3]));
    for calc in &model.settings.volume_calculations {
        assert_eq!(calc.lower_left, [-10.0; 3]);
        assert_eq!(calc.upper_right, [10.0; 3]);
    }
    Ok(())
}

/// Point sampling of the universe and the water layer agrees with the
/// analytic volumes.
#[test]
fn point_estimates_match_reference() -> anyhow::Result<()> {
    let reference = reference()?;

    let universe = run_request(2e-3, 2, options())?;
    assert_eq!(universe.domain_type, DomainType::Universe);
    assert_eq!(universe.samples, 200_000);
    let c = compare(&universe, &reference.universe_map());
    assert_eq!(c.len(), 1);
    assert!(c[0].within(5.0), "universe: {:?}", c[0]);

    let cells = run_request(2e-3, 0, options())?;
    let water = compare(&cells, &reference.cell_map())
        .into_iter()
        .find(|c| c.id == 5)
        .expect("water cell compared");
    assert!(water.within(5.0), "water: {water:?}");
    assert!(water.rel_diff.abs() < 0.02);
    Ok(())
}

/// Ray sampling of the universe and the water material agrees with the
/// analytic volumes.
#[test]
fn ray_estimates_match_reference() -> anyhow::Result<()> {
    let reference = reference()?;

    let universe = run_request(1e-3, 5, options())?;
    assert_eq!(universe.method, Estimator::Ray);
    let c = compare(&universe, &reference.universe_map());
    assert!(c[0].within(5.0), "universe: {:?}", c[0]);
    assert!(c[0].estimate.std_dev > 0.0);

    let materials = run_request(1e-3, 4, options())?;
    let water = compare(&materials, &reference.material_map())
        .into_iter()
        .find(|c| c.id == WATER)
        .expect("water material compared");
    assert!(water.within(5.0), "water: {water:?}");
    Ok(())
}

/// Cell volumes add up to the universe volume sample by sample.
#[test]
fn cells_sum_to_universe() -> anyhow::Result<()> {
    let cells = run_request(1e-3, 0, options())?;
    let universe = run_request(1e-3, 2, options())?;
    let total: f64 = cells.domains.iter().map(|d| d.volume.mean).sum();
    let whole = universe.domains[0].volume.mean;
    assert!(Tolerance::DEFAULT.volumes_equal(total, whole));
    Ok(())
}

/// Same seed, same numbers, whatever the thread count.
#[test]
fn results_are_deterministic_across_threads() -> anyhow::Result<()> {
    let options = VolumeOptions {
        batch_size: 1_000,
        ..options()
    };
    for request in [1, 3] {
        let one = run_request(2e-4, request, options.clone().with_threads(1))?;
        let four = run_request(2e-4, request, options.clone().with_threads(4))?;
        assert_eq!(one, four);
    }
    Ok(())
}

/// Results survive a JSON round trip and can be stored on the model.
#[test]
fn results_apply_to_model() -> anyhow::Result<()> {
    let mut model = spheres::model(1e-4)?;
    let materials = run_request(1e-4, 1, options())?;
    let back = VolumeResult::from_json(&materials.to_json()?)?;
    assert_eq!(back, materials);

    back.apply_to_model(&mut model);
    let water = model.material(WATER).and_then(|m| m.volume);
    assert_eq!(water, Some(materials.domain(WATER).map(|d| d.volume.mean).unwrap_or_default()));

    // Water atoms: H1 and O16 in a 2:1 ratio.
    let atoms = &materials.domain(WATER).expect("water domain").atoms;
    assert_eq!(atoms.len(), 2);
    assert_eq!(atoms[0].nuclide, "H1");
    assert!((atoms[0].atoms.mean / atoms[1].atoms.mean - 2.0).abs() < 1e-9);
    Ok(())
}

/// The exported settings carry the six requests in order.
#[test]
fn exported_descriptors() -> anyhow::Result<()> {
    let model = spheres::model(1.0)?;
    let dir = std::env::temp_dir().join(format!("mcvol-spheres-{}", std::process::id()));
    let paths = mcvol::export_model(&model, &dir)?;
    assert_eq!(paths.len(), 3);

    let settings = std::fs::read_to_string(dir.join("settings.xml"))?;
    assert_eq!(settings.matches("<volume_calc>").count(), 6);
    assert_eq!(settings.matches("<samples>100000000</samples>").count(), 3);
    assert_eq!(settings.matches("<samples>30000000</samples>").count(), 3);
    assert!(settings.contains("<run_mode>volume</run_mode>"));

    let geometry = std::fs::read_to_string(dir.join("geometry.xml"))?;
    assert!(geometry.contains("name=\"4.1888e-06 | R &lt; 0.01 cm sphere\""));
    assert!(geometry.contains("boundary=\"vacuum\""));

    let materials = std::fs::read_to_string(dir.join("materials.xml"))?;
    assert!(materials.contains("<nuclide name=\"U235\""));
    assert_eq!(materials.matches("<sab name=\"c_H_in_H2O\"/>").count(), 2);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
