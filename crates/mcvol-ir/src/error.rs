//! Error types for model construction and validation.

use thiserror::Error;

/// Errors raised while building or validating a model.
#[derive(Error, Debug)]
pub enum IrError {
    /// Element symbol has no natural-abundance data.
    #[error("unknown element: {0}")]
    UnknownElement(String),

    /// Nuclide name could not be interpreted.
    #[error("unknown nuclide: {0}")]
    UnknownNuclide(String),

    /// Enrichment given for an element that does not support it, or out of range.
    #[error("invalid enrichment: {0}")]
    InvalidEnrichment(String),

    /// Composition or density problem in a material.
    #[error("material {id}: {reason}")]
    InvalidMaterial {
        /// Material id.
        id: u32,
        /// What is wrong with it.
        reason: String,
    },

    /// Surface with non-physical coefficients.
    #[error("surface {id}: {reason}")]
    InvalidSurface {
        /// Surface id.
        id: u32,
        /// What is wrong with it.
        reason: String,
    },

    /// Region expression could not be parsed.
    #[error("cannot parse region '{expr}': {reason}")]
    RegionParse {
        /// The offending expression.
        expr: String,
        /// Parser message.
        reason: String,
    },

    /// A region references a surface that is not declared.
    #[error("surface {0} is not defined")]
    UnknownSurface(u32),

    /// A cell is filled with a material that is not declared.
    #[error("cell {cell} is filled with undefined material {material}")]
    UnknownMaterial {
        /// Cell id.
        cell: u32,
        /// Material id.
        material: u32,
    },

    /// Two entities of the same kind share an id.
    #[error("duplicate {kind} id {id}")]
    DuplicateId {
        /// Entity kind ("cell", "surface", "material").
        kind: &'static str,
        /// The repeated id.
        id: u32,
    },

    /// Malformed volume calculation request.
    #[error("invalid volume calculation: {0}")]
    InvalidVolumeCalc(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, IrError>;
