//! mcvol CLI - stochastic volume calculations
//!
//! Builds the spheres-within-spheres benchmark (or loads a JSON model),
//! writes the XML descriptors and runs every volume calculation.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use mcvol::ir::DomainType;
use mcvol::spheres::{self, Radii, ReferenceVolumes};
use mcvol::{calculate_volumes, compare, export_model, Model, VolumeResult};

mod config;

use config::{Config, Overrides};

#[derive(Parser)]
#[command(name = "mcvol")]
#[command(about = "Monte Carlo volume estimation for CSG geometries", long_about = None)]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every volume calculation and save the results
    Run {
        /// JSON model file (default: the spheres benchmark)
        #[arg(long)]
        model: Option<PathBuf>,
        /// Configuration file (default: ./mcvol.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
        /// Multiply every sample count by this factor
        #[arg(long)]
        scale: Option<f64>,
        /// Worker threads (0 = all cores)
        #[arg(long)]
        threads: Option<usize>,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Skip writing the XML descriptors
        #[arg(long)]
        no_xml: bool,
    },
    /// Write the XML descriptors only
    Export {
        /// JSON model file (default: the spheres benchmark)
        #[arg(long)]
        model: Option<PathBuf>,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Print the analytic volumes of the benchmark
    Reference,
    /// Summarize a model
    Info {
        /// JSON model file (default: the spheres benchmark)
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Write the benchmark model as JSON
    Model {
        /// Output file
        #[arg(long)]
        out: PathBuf,
        /// Multiply every sample count by this factor
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            model,
            config,
            seed,
            scale,
            threads,
            out,
            no_xml,
        } => {
            let mut config = Config::load(config.as_deref())?;
            config.apply_overrides(&Overrides {
                seed,
                scale,
                threads,
                out,
                no_xml,
            });
            config.validate()?;
            run(model.as_deref(), &config)?;
        }
        Commands::Export { model, out } => {
            let model = load_model(model.as_deref(), 1.0)?;
            for path in export_model(&model, &out)? {
                println!("Wrote {}", path.display());
            }
        }
        Commands::Reference => show_reference()?,
        Commands::Info { model } => {
            let model = load_model(model.as_deref(), 1.0)?;
            show_info(&model)?;
        }
        Commands::Model { out, scale } => {
            let model = spheres::model(scale)?;
            fs::write(&out, model.to_json()?)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Wrote benchmark model to {}", out.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// The benchmark when `path` is `None`, otherwise a JSON model with its
/// sample counts scaled.
fn load_model(path: Option<&Path>, scale: f64) -> Result<Model> {
    let Some(path) = path else {
        return Ok(spheres::model(scale)?);
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut model = Model::from_json(&json)?;
    for calc in &mut model.settings.volume_calculations {
        calc.samples = spheres::scaled_samples(calc.samples, scale);
    }
    model.validate()?;
    Ok(model)
}

fn run(model_path: Option<&Path>, config: &Config) -> Result<()> {
    let mut model = load_model(model_path, config.run.sample_scale)?;
    if model.settings.volume_calculations.is_empty() {
        bail!("model has no volume calculations");
    }
    let reference = match model_path {
        None => Some(ReferenceVolumes::new(Radii::default())?),
        Some(_) => None,
    };

    let out = &config.run.output_dir;
    fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    if config.export.xml {
        export_model(&model, out)?;
    }

    let started = Instant::now();
    let results = calculate_volumes(&model, config.volume_options())?;
    let elapsed = started.elapsed();

    for (i, result) in results.iter().enumerate() {
        let path = out.join(format!("volume_{}.json", i + 1));
        result.save(&path)?;
        let references = reference.as_ref().map(|r| reference_map(r, result.domain_type));
        print_result(i + 1, result, references.as_ref());
        result.apply_to_model(&mut model);
    }

    let model_path = out.join("model.json");
    fs::write(&model_path, model.to_json()?)?;
    println!(
        "\n{} calculation(s) in {:.2} s; results in {}",
        results.len(),
        elapsed.as_secs_f64(),
        out.display()
    );
    Ok(())
}

fn reference_map(reference: &ReferenceVolumes, domain_type: DomainType) -> HashMap<u32, f64> {
    match domain_type {
        DomainType::Cell => reference.cell_map(),
        DomainType::Material => reference.material_map(),
        DomainType::Universe => reference.universe_map(),
    }
}

fn print_result(n: usize, result: &VolumeResult, references: Option<&HashMap<u32, f64>>) {
    println!(
        "\nVolume calculation {}: {}s, {} estimator, {} samples x {} iteration(s)",
        n,
        result.domain_type.as_str(),
        result.method.as_str(),
        result.samples,
        result.iterations
    );

    let comparisons = references.map(|r| compare(result, r)).unwrap_or_default();
    if comparisons.is_empty() {
        println!("  {:>6}  {:>14}  {:>12}", "id", "volume [cm3]", "std dev");
        for d in &result.domains {
            println!(
                "  {:>6}  {:>14.6e}  {:>12.4e}",
                d.id, d.volume.mean, d.volume.std_dev
            );
        }
        return;
    }

    println!(
        "  {:>6}  {:>14}  {:>12}  {:>14}  {:>10}  {:>8}",
        "id", "volume [cm3]", "std dev", "reference", "rel diff", "z"
    );
    for c in &comparisons {
        println!(
            "  {:>6}  {:>14.6e}  {:>12.4e}  {:>14.6e}  {:>+10.2e}  {:>+8.2}",
            c.id, c.estimate.mean, c.estimate.std_dev, c.reference, c.rel_diff, c.z_score
        );
    }
}

fn show_reference() -> Result<()> {
    let reference = ReferenceVolumes::new(Radii::default())?;

    println!("Cells:");
    for (id, name) in spheres::CELL_IDS.iter().zip(reference.cell_names()) {
        println!("  {id}: {name}");
    }

    println!("\nMaterials:");
    let model = spheres::model(1.0)?;
    for id in spheres::MATERIAL_IDS {
        let name = model
            .material(id)
            .and_then(|m| m.name.as_deref())
            .unwrap_or("unnamed");
        if let Some(v) = reference.material(id) {
            println!("  {id}: {} | {name}", mcvol::format::sci(v, 10, 4));
        }
    }

    println!(
        "\nUniverse {}: {}",
        spheres::ROOT_UNIVERSE,
        mcvol::format::sci(reference.universe(), 10, 4)
    );
    println!("Sum of cells: {}", mcvol::format::sci(reference.total(), 10, 4));
    Ok(())
}

fn show_info(model: &Model) -> Result<()> {
    println!("mcvol model");
    println!("  Materials: {}", model.materials.len());
    println!("  Surfaces: {}", model.geometry.surfaces.len());
    println!("  Cells: {}", model.geometry.root.cells.len());
    println!("  Run mode: {}", model.settings.run_mode.as_str());

    println!("\nMaterials:");
    for m in &model.materials {
        let name = m.name.as_deref().unwrap_or("unnamed");
        let density = m
            .density
            .as_ref()
            .map(|d| format!("{} {}", d.value, d.units.as_str()))
            .unwrap_or_else(|| "no density".to_string());
        println!("  {}: {} ({}, nuclides: {})", m.id, name, density, m.nuclides().join(" "));
    }

    println!("\nSurfaces:");
    for s in &model.geometry.surfaces {
        let coeffs: Vec<String> = s.kind.coefficients().iter().map(f64::to_string).collect();
        println!(
            "  {}: {} [{}] {}",
            s.id,
            s.kind.type_name(),
            coeffs.join(", "),
            s.boundary.as_str()
        );
    }

    println!("\nCells (universe {}):", model.geometry.root.id);
    for c in &model.geometry.root.cells {
        let fill = match c.fill.material() {
            Some(id) => format!("material {id}"),
            None => "void".to_string(),
        };
        println!(
            "  {}: {} | {} | {}",
            c.id,
            c.region,
            fill,
            c.name.as_deref().unwrap_or("")
        );
    }

    let bounds = model.geometry.bounding_box()?;
    let (lo, hi) = bounds.corners();
    println!("\nBounding box: {lo:?} .. {hi:?}");

    println!("\nVolume calculations:");
    for (i, calc) in model.settings.volume_calculations.iter().enumerate() {
        println!(
            "  {}: {} {:?}, {} {} samples",
            i + 1,
            calc.domain_type.as_str(),
            calc.domain_ids,
            calc.samples,
            calc.method.as_str()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_model_scales_json_samples() {
        let path = std::env::temp_dir().join(format!("mcvol-model-{}.json", std::process::id()));
        fs::write(&path, spheres::model(1.0).unwrap().to_json().unwrap()).unwrap();
        let model = load_model(Some(&path), 1e-4).unwrap();
        fs::remove_file(&path).unwrap();

        let samples: Vec<u64> = model
            .settings
            .volume_calculations
            .iter()
            .map(|c| c.samples)
            .collect();
        assert_eq!(samples, vec![10_000, 10_000, 10_000, 3_000, 3_000, 3_000]);
    }

    #[test]
    fn test_load_model_defaults_to_benchmark() {
        let model = load_model(None, 1e-6).unwrap();
        assert_eq!(model.geometry.root.cells.len(), 6);
        assert_eq!(model.settings.volume_calculations[0].samples, 100);
        assert_eq!(model.settings.volume_calculations[3].samples, 30);
    }

    #[test]
    fn test_load_model_missing_file() {
        let err = load_model(Some(Path::new("/nonexistent/model.json")), 1.0).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
