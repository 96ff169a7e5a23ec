#![warn(missing_docs)]

//! Stochastic volume estimation for mcvol models.
//!
//! Two estimators are provided:
//!
//! - **point**: uniform points in the request box, each scoring 1 in the
//!   domains of the cell that contains it;
//! - **ray**: isotropic lines through uniform points, each scoring the share
//!   of its chord through the box that lies in each domain.
//!
//! Both yield `volume = mean(f) * V_box` with standard deviation
//! `V_box * sqrt((mean(f²) - mean(f)²) / (n - 1))`. Samples are drawn in
//! seeded batches run in parallel with rayon, so results depend only on the
//! seed and batch size, never on the number of threads.
//!
//! # Example
//!
//! ```
//! use mcvol_ir::{Cell, Fill, Geometry, Model, Settings, Surface, Universe, VolumeCalculation};
//! use mcvol_math::Aabb3;
//! use mcvol_volume::{calculate_volumes, VolumeOptions};
//!
//! let s = Surface::sphere(1, 1.0);
//! let geometry = Geometry::new(Universe::new(0, vec![Cell::new(1, Fill::Void, -&s)]), vec![s]);
//! let bounds = Aabb3::from_corners([-1.0; 3], [1.0; 3]);
//! let mut model = Model::new(Vec::new(), geometry, Settings::default());
//! model.settings.volume_calculations.push(VolumeCalculation::cells([1], 10_000, &bounds));
//!
//! let results = calculate_volumes(&model, VolumeOptions::default()).unwrap();
//! let v = results[0].domains[0].volume;
//! assert!((v.mean - 4.18879).abs() < 5.0 * v.std_dev);
//! ```

mod domain;
pub mod engine;
pub mod error;
pub mod options;
pub mod report;
pub mod result;
mod sampler;
mod tally;

pub use engine::{calculate_volumes, VolumeEngine};
pub use error::{Result, VolumeError};
pub use options::VolumeOptions;
pub use report::{compare, Comparison};
pub use result::{DomainVolume, Estimate, NuclideAtoms, VolumeResult};
