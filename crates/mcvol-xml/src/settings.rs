//! `settings.xml`

use mcvol_ir::Settings;

use crate::doc::{join, XmlDoc};
use crate::error::Result;

/// Render the settings descriptor with one `<volume_calc>` per request.
pub fn settings_xml(settings: &Settings) -> Result<String> {
    let mut doc = XmlDoc::new()?;
    doc.open("settings", &[])?;
    doc.text("run_mode", settings.run_mode.as_str())?;

    for calc in &settings.volume_calculations {
        doc.open("volume_calc", &[])?;
        doc.text("domain_type", calc.domain_type.as_str())?;
        doc.text("domain_ids", &join(&calc.domain_ids))?;
        doc.text("samples", &calc.samples.to_string())?;
        doc.text("lower_left", &join(&calc.lower_left))?;
        doc.text("upper_right", &join(&calc.upper_right))?;
        doc.text("estimator", calc.method.as_str())?;
        if let Some(trigger) = &calc.trigger {
            doc.empty(
                "threshold",
                &[
                    ("type", trigger.metric.as_str().to_string()),
                    ("threshold", trigger.threshold.to_string()),
                ],
            )?;
        }
        doc.close("volume_calc")?;
    }

    doc.close("settings")?;
    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcvol_ir::{Estimator, RunMode, TriggerMetric, VolumeCalculation};
    use mcvol_math::Aabb3;

    #[test]
    fn test_settings_xml() {
        let bounds = Aabb3::from_corners([-10.0; 3], [10.0; 3]);
        let settings = Settings {
            run_mode: RunMode::Volume,
            volume_calculations: vec![
                VolumeCalculation::cells([1, 2, 3], 100_000_000, &bounds),
                VolumeCalculation::universes([0], 30_000_000, &bounds)
                    .with_method(Estimator::Ray)
                    .with_trigger(TriggerMetric::RelErr, 0.001),
            ],
        };
        let xml = settings_xml(&settings).unwrap();
        assert!(xml.contains("<run_mode>volume</run_mode>"));
        assert_eq!(xml.matches("<volume_calc>").count(), 2);
        assert!(xml.contains("<domain_ids>1 2 3</domain_ids>"));
        assert!(xml.contains("<samples>100000000</samples>"));
        assert!(xml.contains("<lower_left>-10 -10 -10</lower_left>"));
        assert!(xml.contains("<estimator>ray</estimator>"));
        assert!(xml.contains("<threshold type=\"rel_err\" threshold=\"0.001\"/>"));
    }
}
