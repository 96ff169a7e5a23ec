//! `geometry.xml`

use mcvol_ir::{BoundaryType, Fill, Geometry};

use crate::doc::{join, XmlDoc};
use crate::error::Result;

/// Render the geometry descriptor: cells first, then surfaces.
pub fn geometry_xml(geometry: &Geometry) -> Result<String> {
    let mut doc = XmlDoc::new()?;
    doc.open("geometry", &[])?;

    for cell in &geometry.root.cells {
        let mut attrs = vec![("id", cell.id.to_string())];
        attrs.push((
            "material",
            match cell.fill {
                Fill::Material(id) => id.to_string(),
                Fill::Void => "void".to_string(),
            },
        ));
        if let Some(name) = &cell.name {
            attrs.push(("name", name.clone()));
        }
        attrs.push(("region", cell.region.to_string()));
        attrs.push(("universe", geometry.root.id.to_string()));
        doc.empty("cell", &attrs)?;
    }

    for surface in &geometry.surfaces {
        let mut attrs = vec![
            ("id", surface.id.to_string()),
            ("type", surface.kind.type_name().to_string()),
            ("coeffs", join(&surface.kind.coefficients())),
        ];
        if surface.boundary != BoundaryType::Transmission {
            attrs.push(("boundary", surface.boundary.as_str().to_string()));
        }
        if let Some(name) = &surface.name {
            attrs.push(("name", name.clone()));
        }
        doc.empty("surface", &attrs)?;
    }

    doc.close("geometry")?;
    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcvol_ir::{Cell, Surface, Universe};

    #[test]
    fn test_geometry_xml() {
        let s1 = Surface::sphere(1, 10.0).with_boundary(BoundaryType::Vacuum);
        let s5 = Surface::sphere(5, 0.01).with_center(0.2, 0.0, 0.0);
        let cells = vec![
            Cell::new(1, Fill::Material(4), -&s5).with_name("small"),
            Cell::new(2, Fill::Void, s5.positive() & -&s1),
        ];
        let g = Geometry::new(Universe::new(0, cells), vec![s1, s5]);
        let xml = geometry_xml(&g).unwrap();

        assert!(xml.contains(
            "<cell id=\"1\" material=\"4\" name=\"small\" region=\"-5\" universe=\"0\"/>"
        ));
        assert!(xml.contains("<cell id=\"2\" material=\"void\" region=\"+5 -1\" universe=\"0\"/>"));
        assert!(xml.contains(
            "<surface id=\"1\" type=\"sphere\" coeffs=\"0 0 0 10\" boundary=\"vacuum\"/>"
        ));
        assert!(xml.contains("<surface id=\"5\" type=\"sphere\" coeffs=\"0.2 0 0 0.01\"/>"));
    }
}
