//! Error types for the volume engine.

use thiserror::Error;

/// Errors that can occur while estimating volumes.
#[derive(Error, Debug)]
pub enum VolumeError {
    /// The model or a request is malformed.
    #[error(transparent)]
    Model(#[from] mcvol_ir::IrError),

    /// A request names a domain the model does not have.
    #[error("no {kind} with id {id} in the model")]
    UnknownDomain {
        /// Domain type (`cell`, `material`, `universe`).
        kind: &'static str,
        /// Requested id.
        id: u32,
    },

    /// The model has nothing to calculate.
    #[error("model has no volume calculations")]
    NoVolumeCalculations,

    /// Invalid engine options.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Dedicated thread pool could not be created.
    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Result file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Result file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for volume calculations.
pub type Result<T> = std::result::Result<T, VolumeError>;
