#![warn(missing_docs)]

//! XML input descriptors for mcvol models.
//!
//! A [`Model`] is written as the conventional trio of transport-code input
//! files: `materials.xml`, `geometry.xml` and `settings.xml`.

mod doc;
pub mod error;
pub mod geometry;
pub mod materials;
pub mod settings;

pub use error::{Result, XmlError};
pub use geometry::geometry_xml;
pub use materials::materials_xml;
pub use settings::settings_xml;

use mcvol_ir::Model;
use std::fs;
use std::path::{Path, PathBuf};

/// File names written by [`export_model`], in write order.
pub const DESCRIPTOR_FILES: [&str; 3] = ["materials.xml", "geometry.xml", "settings.xml"];

/// Validate `model` and write its three descriptors into `dir`.
///
/// The directory is created if missing. Returns the written paths.
pub fn export_model(model: &Model, dir: &Path) -> Result<Vec<PathBuf>> {
    model.validate()?;
    fs::create_dir_all(dir)?;

    let contents = [
        materials_xml(&model.materials)?,
        geometry_xml(&model.geometry)?,
        settings_xml(&model.settings)?,
    ];

    let mut written = Vec::with_capacity(DESCRIPTOR_FILES.len());
    for (name, text) in DESCRIPTOR_FILES.iter().zip(contents) {
        let path = dir.join(name);
        fs::write(&path, text)?;
        log::debug!("wrote {}", path.display());
        written.push(path);
    }
    log::info!("exported model descriptors to {}", dir.display());
    Ok(written)
}
