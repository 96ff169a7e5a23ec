//! `mcvol.toml` run configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use mcvol::volume::options::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_ITERATIONS};
use mcvol::VolumeOptions;
use serde::{Deserialize, Serialize};

/// File read when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "mcvol.toml";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub run: RunConfig,
    pub export: ExportConfig,
}

/// `[run]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub seed: u64,
    pub batch_size: u64,
    pub max_iterations: u32,
    /// 0 uses every core.
    pub threads: usize,
    /// Multiplier applied to every request's sample count.
    pub sample_scale: f64,
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            batch_size: DEFAULT_BATCH_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            threads: 0,
            sample_scale: 1.0,
            output_dir: PathBuf::from("results"),
        }
    }
}

/// `[export]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Write the XML descriptors next to the results.
    pub xml: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { xml: true }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub scale: Option<f64>,
    pub threads: Option<usize>,
    pub out: Option<PathBuf>,
    pub no_xml: bool,
}

impl Config {
    /// Read `path`, or `mcvol.toml` if present, or fall back to defaults.
    ///
    /// Values are checked by [`Config::validate`] once flags are applied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::read(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    /// Replace file values with the flags that were given.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(seed) = overrides.seed {
            self.run.seed = seed;
        }
        if let Some(scale) = overrides.scale {
            self.run.sample_scale = scale;
        }
        if let Some(threads) = overrides.threads {
            self.run.threads = threads;
        }
        if let Some(out) = &overrides.out {
            self.run.output_dir = out.clone();
        }
        if overrides.no_xml {
            self.export.xml = false;
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config =
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.run.batch_size == 0 {
            bail!("run.batch_size must be positive");
        }
        if self.run.max_iterations == 0 {
            bail!("run.max_iterations must be positive");
        }
        if !(self.run.sample_scale > 0.0 && self.run.sample_scale.is_finite()) {
            bail!("run.sample_scale must be positive, got {}", self.run.sample_scale);
        }
        Ok(())
    }

    /// Engine options for this configuration.
    pub fn volume_options(&self) -> VolumeOptions {
        VolumeOptions {
            seed: self.run.seed,
            batch_size: self.run.batch_size,
            max_iterations: self.run.max_iterations,
            threads: self.run.threads,
        }
    }
}
