#![warn(missing_docs)]

//! Ray and point queries against mcvol CSG geometry.
//!
//! # Architecture
//!
//! - [`Ray`] - Ray representation with origin and direction
//! - [`intersect`] - Closed-form ray-surface intersection per surface family
//! - [`GeometryIndex`] - Compiled cells for point location
//! - [`Segment`] - Per-cell pieces of a chord, from [`GeometryIndex::trace_chord`]
//!
//! # Example
//!
//! ```
//! use mcvol_ir::{Cell, Fill, Geometry, Surface, Universe};
//! use mcvol_math::{Aabb3, Point3, Vec3};
//! use mcvol_raytrace::{GeometryIndex, Ray};
//!
//! let s = Surface::sphere(1, 1.0);
//! let geometry = Geometry::new(Universe::new(0, vec![Cell::new(1, Fill::Void, -&s)]), vec![s]);
//! let index = GeometryIndex::build(&geometry).unwrap();
//!
//! let ray = Ray::new(Point3::origin(), Vec3::new(0.0, 0.0, 1.0));
//! let mut segments = Vec::new();
//! let length = index
//!     .trace_chord(&ray, &Aabb3::around(&Point3::origin(), 2.0), &mut segments)
//!     .unwrap();
//! assert_eq!(length, 4.0);
//! ```

pub mod index;
pub mod intersect;
mod ray;
pub mod trace;

pub use index::{GeometryIndex, IndexedCell};
pub use ray::Ray;
pub use trace::Segment;
