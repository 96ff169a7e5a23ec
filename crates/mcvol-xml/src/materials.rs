//! `materials.xml`

use mcvol_ir::{DensityUnit, Material};

use crate::doc::XmlDoc;
use crate::error::Result;

/// Render the materials descriptor.
pub fn materials_xml(materials: &[Material]) -> Result<String> {
    let mut doc = XmlDoc::new()?;
    doc.open("materials", &[])?;
    for m in materials {
        let mut attrs = vec![("id", m.id.to_string())];
        if let Some(name) = &m.name {
            attrs.push(("name", name.clone()));
        }
        if m.depletable {
            attrs.push(("depletable", "true".to_string()));
        }
        doc.open("material", &attrs)?;

        if let Some(density) = &m.density {
            let mut attrs = vec![("units", density.units.as_str().to_string())];
            if density.units != DensityUnit::Sum {
                attrs.push(("value", density.value.to_string()));
            }
            doc.empty("density", &attrs)?;
        }
        for c in &m.components {
            doc.empty(
                "nuclide",
                &[
                    ("name", c.nuclide.clone()),
                    (c.percent_type.as_str(), c.fraction.to_string()),
                ],
            )?;
        }
        for table in &m.sab {
            doc.empty("sab", &[("name", table.clone())])?;
        }
        doc.close("material")?;
    }
    doc.close("materials")?;
    doc.finish()
}
