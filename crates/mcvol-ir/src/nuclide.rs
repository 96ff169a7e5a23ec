//! Built-in nuclide data: atomic masses and natural isotopic abundances.
//!
//! Only the elements needed by typical volume benchmarks are tabulated.
//! Nuclides outside the table fall back to their mass number, which is
//! accurate to well under a percent for density conversions.

use crate::error::{IrError, Result};

/// Avogadro constant (1/mol).
pub const AVOGADRO: f64 = 6.02214076e23;

/// Tabulated isotope: element symbol, nuclide name, atomic mass (u),
/// natural atom abundance.
const ISOTOPES: &[(&str, &str, f64, f64)] = &[
    ("H", "H1", 1.00782503223, 0.99984426),
    ("H", "H2", 2.01410177812, 0.00015574),
    ("He", "He3", 3.0160293201, 0.000002),
    ("He", "He4", 4.00260325413, 0.999998),
    ("B", "B10", 10.01293695, 0.199),
    ("B", "B11", 11.00930536, 0.801),
    ("C", "C12", 12.0, 0.9893),
    ("C", "C13", 13.00335483507, 0.0107),
    ("N", "N14", 14.00307400443, 0.99636),
    ("N", "N15", 15.00010889888, 0.00364),
    ("O", "O16", 15.99491461957, 0.99757),
    ("O", "O17", 16.9991317565, 0.00038),
    ("O", "O18", 17.99915961286, 0.00205),
    ("U", "U234", 234.0409523, 0.000054),
    ("U", "U235", 235.0439301, 0.007204),
    ("U", "U236", 236.0455682, 0.0),
    ("U", "U238", 238.0507884, 0.992742),
];

/// Atomic mass of a nuclide in unified atomic mass units.
///
/// Names follow the `<Symbol><A>[_m<N>]` convention (`"U235"`, `"Am242_m1"`).
pub fn atomic_mass(nuclide: &str) -> Result<f64> {
    if let Some(&(_, _, mass, _)) = ISOTOPES.iter().find(|(_, n, _, _)| *n == nuclide) {
        return Ok(mass);
    }
    mass_number(nuclide).map(f64::from)
}

/// Parse the mass number out of a nuclide name.
pub fn mass_number(nuclide: &str) -> Result<u32> {
    let unknown = || IrError::UnknownNuclide(nuclide.to_string());
    let base = nuclide.split('_').next().unwrap_or_default();
    let split = base.find(|c: char| c.is_ascii_digit()).ok_or_else(unknown)?;
    let (symbol, digits) = base.split_at(split);

    let mut chars = symbol.chars();
    let valid_symbol = matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_lowercase())
        && symbol.len() <= 3;
    if !valid_symbol {
        return Err(unknown());
    }
    match digits.parse::<u32>() {
        Ok(a) if a > 0 => Ok(a),
        _ => Err(unknown()),
    }
}

/// Naturally occurring isotopes of an element as `(nuclide, atom fraction)`.
pub fn natural_isotopes(element: &str) -> Result<Vec<(&'static str, f64)>> {
    let isotopes: Vec<_> = ISOTOPES
        .iter()
        .filter(|(e, _, _, abundance)| *e == element && *abundance > 0.0)
        .map(|&(_, n, _, abundance)| (n, abundance))
        .collect();
    if isotopes.is_empty() {
        return Err(IrError::UnknownElement(element.to_string()));
    }
    Ok(isotopes)
}

/// Isotopic atom fractions of uranium enriched to `enrichment` wt% U-235.
///
/// U-234 and U-236 follow the usual correlations with U-235
/// (0.0089·e and 0.0046·e by weight), U-238 takes the remainder.
pub fn enriched_uranium(enrichment: f64) -> Result<Vec<(&'static str, f64)>> {
    if !(0.0..=100.0).contains(&enrichment) {
        return Err(IrError::InvalidEnrichment(format!(
            "{enrichment} wt% is outside [0, 100]"
        )));
    }
    let u238 = 100.0 - 1.0135 * enrichment;
    if u238 < 0.0 {
        return Err(IrError::InvalidEnrichment(format!(
            "{enrichment} wt% leaves no U238"
        )));
    }
    if enrichment > 5.0 {
        log::warn!(
            "uranium enrichment of {enrichment} wt% is outside the range the isotope correlations were fitted for (<= 5%)"
        );
    }

    let weights = [
        ("U234", 0.0089 * enrichment),
        ("U235", enrichment),
        ("U236", 0.0046 * enrichment),
        ("U238", u238),
    ];
    let mut moles = Vec::with_capacity(weights.len());
    for (nuclide, w) in weights {
        moles.push((nuclide, w / atomic_mass(nuclide)?));
    }
    let total: f64 = moles.iter().map(|(_, m)| m).sum();
    Ok(moles
        .into_iter()
        .filter(|(_, m)| *m > 0.0)
        .map(|(n, m)| (n, m / total))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_atomic_mass_table_and_fallback() {
        assert_relative_eq!(atomic_mass("O16").unwrap(), 15.99491461957);
        assert_relative_eq!(atomic_mass("C12").unwrap(), 12.0);
        assert_relative_eq!(atomic_mass("Pu239").unwrap(), 239.0);
        assert_relative_eq!(atomic_mass("Am242_m1").unwrap(), 242.0);
        assert!(atomic_mass("water").is_err());
        assert!(atomic_mass("u235").is_err());
        assert!(atomic_mass("U0").is_err());
    }

    #[test]
    fn test_natural_isotopes_normalized() {
        for element in ["H", "He", "B", "C", "N", "O", "U"] {
            let isotopes = natural_isotopes(element).unwrap();
            let total: f64 = isotopes.iter().map(|(_, f)| f).sum();
            assert!((total - 1.0).abs() < 1e-6, "{element}: {total}");
        }
        // U236 has no natural abundance
        assert!(natural_isotopes("U").unwrap().iter().all(|(n, _)| *n != "U236"));
        assert!(matches!(natural_isotopes("Xx"), Err(IrError::UnknownElement(_))));
    }

    #[test]
    fn test_enriched_uranium() {
        let fractions = enriched_uranium(3.0).unwrap();
        assert_eq!(fractions.len(), 4);
        let total: f64 = fractions.iter().map(|(_, f)| f).sum();
        assert_relative_eq!(total, 1.0, max_relative = 1e-12);

        let u235 = fractions.iter().find(|(n, _)| *n == "U235").unwrap().1;
        // 3 wt% is slightly above 3 at% since U235 is lighter than U238
        assert!(u235 > 0.0303 && u235 < 0.0305, "{u235}");

        let natural = enriched_uranium(0.0).unwrap();
        assert_eq!(natural, vec![("U238", 1.0)]);

        assert!(enriched_uranium(-1.0).is_err());
        assert!(enriched_uranium(99.0).is_err());
    }
}
