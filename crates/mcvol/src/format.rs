//! Number formatting for cell labels and reports.

/// Scientific notation with `precision` decimals and a signed exponent of at
/// least two digits, right-aligned to `width` columns.
///
/// `sci(4.18879e-6, 10, 4)` gives `"4.1888e-06"`.
pub fn sci(value: f64, width: usize, precision: usize) -> String {
    let raw = format!("{value:.precision$e}");
    let text = match raw.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => raw.clone(),
        },
        // inf / NaN
        None => raw.clone(),
    };
    format!("{text:>width$}")
}
