//! Engine options.

use serde::{Deserialize, Serialize};

use mcvol_ir::IrError;

use crate::error::{Result, VolumeError};

/// Default number of samples per parallel batch.
pub const DEFAULT_BATCH_SIZE: u64 = 100_000;

/// Default cap on trigger iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// How the engine draws and schedules samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeOptions {
    /// Base seed; batch `k` uses `seed + k`.
    pub seed: u64,
    /// Samples per batch.
    pub batch_size: u64,
    /// Iteration cap when a trigger is set.
    pub max_iterations: u32,
    /// Worker threads; 0 uses the global rayon pool.
    pub threads: usize,
}

impl Default for VolumeOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            batch_size: DEFAULT_BATCH_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            threads: 0,
        }
    }
}

impl VolumeOptions {
    /// Replace the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Validate options.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(VolumeError::InvalidOptions(
                "batch_size must be positive".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(VolumeError::InvalidOptions(
                "max_iterations must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Batch layout of one iteration of `samples` draws, repeated at most
    /// `iterations` times.
    ///
    /// Fails when the total number of draws does not fit in a `u64`.
    pub(crate) fn batch_plan(&self, samples: u64, iterations: u32) -> Result<BatchPlan> {
        if samples.checked_mul(u64::from(iterations)).is_none() {
            return Err(IrError::InvalidVolumeCalc(format!(
                "{samples} samples over up to {iterations} iterations overflows the sample counter"
            ))
            .into());
        }
        Ok(BatchPlan {
            samples,
            batch_size: self.batch_size,
            batches: samples.div_ceil(self.batch_size),
        })
    }
}

/// Fixed-size batches covering one iteration; only the last may be short.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BatchPlan {
    samples: u64,
    batch_size: u64,
    /// Number of batches per iteration.
    pub batches: u64,
}

impl BatchPlan {
    /// Draws in batch `k`.
    pub fn size(&self, k: u64) -> u64 {
        let start = k.saturating_mul(self.batch_size);
        self.samples.saturating_sub(start).min(self.batch_size)
    }
}
