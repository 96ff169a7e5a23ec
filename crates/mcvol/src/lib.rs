#![warn(missing_docs)]

//! mcvol: Monte Carlo volume estimation for CSG geometries.
//!
//! Models are built from materials, quadric surfaces and boolean cell
//! regions, exported as XML input descriptors, and measured with point or
//! ray sampling. The [`spheres`] module holds the "spheres within spheres"
//! benchmark whose cell volumes are known exactly.
//!
//! # Example
//!
//! ```rust,no_run
//! use mcvol::{spheres, calculate_volumes, compare, VolumeOptions};
//!
//! let model = spheres::model(0.01).unwrap();
//! let reference = spheres::ReferenceVolumes::new(spheres::Radii::default()).unwrap();
//! let results = calculate_volumes(&model, VolumeOptions::default()).unwrap();
//! for c in compare(&results[0], &reference.cell_map()) {
//!     println!("cell {}: {:.4} ({:+.2} sigma)", c.id, c.estimate.mean, c.z_score);
//! }
//! ```

use thiserror::Error;

pub mod format;
pub mod spheres;

pub use mcvol_ir as ir;
pub use mcvol_math as math;
pub use mcvol_raytrace as raytrace;
pub use mcvol_volume as volume;
pub use mcvol_xml as xml;

pub use mcvol_ir::{Model, VolumeCalculation};
pub use mcvol_volume::{
    calculate_volumes, compare, Comparison, Estimate, VolumeEngine, VolumeError, VolumeOptions,
    VolumeResult,
};
pub use mcvol_xml::export_model;

/// Errors from building the benchmark and its reference values.
#[derive(Error, Debug)]
pub enum ReferenceError {
    /// A radius is not a positive finite number.
    #[error("surface {surface} has invalid radius {radius}")]
    InvalidRadius {
        /// Surface name (`s1`..`s6`).
        surface: &'static str,
        /// Offending radius.
        radius: f64,
    },

    /// The radii are not nested; a shell would have negative volume.
    #[error("radii are out of order: '{shell}' would have volume {volume:e}")]
    NegativeVolume {
        /// Description of the offending cell.
        shell: &'static str,
        /// Computed (negative) volume.
        volume: f64,
    },

    /// Sample scale must be positive and finite.
    #[error("invalid sample scale {0}")]
    InvalidScale(f64),

    /// Building the model failed.
    #[error(transparent)]
    Model(#[from] mcvol_ir::IrError),
}

/// Result type for benchmark construction.
pub type Result<T> = std::result::Result<T, ReferenceError>;
