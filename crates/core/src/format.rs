//! Display formatting for numeric results.

/// Fractional digits used when no precision is given.
pub const DEFAULT_PRECISION: usize = 10;

/// Upper bound on the exponential mantissa digits.
pub const MAX_PRECISION: usize = 100;

const LARGE_THRESHOLD: f64 = 1e10;
const SMALL_THRESHOLD: f64 = 1e-10;

/// Formats `value` with [`DEFAULT_PRECISION`].
pub fn format_number(value: f64) -> String {
    format_number_with_precision(value, DEFAULT_PRECISION)
}

/// Renders a result for display.
///
/// - non-finite values render as `"Error"`
/// - magnitudes above `1e10` or below `1e-10` (but non-zero) use exponential notation with
///   `precision` mantissa digits and a signed exponent, e.g. `1.2345678900e+10`
/// - everything else is rounded to `precision` decimals and printed in its shortest
///   decimal form, so `0.1 + 0.2` renders as `0.3`
pub fn format_number_with_precision(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return "Error".to_string();
    }

    let precision = precision.min(MAX_PRECISION);
    let magnitude = value.abs();

    if magnitude > LARGE_THRESHOLD || (magnitude > 0.0 && magnitude < SMALL_THRESHOLD) {
        return to_exponential(value, precision);
    }

    let factor = 10f64.powi(precision as i32);
    let scaled = value * factor;
    let rounded = if scaled.is_finite() && factor.is_finite() {
        scaled.round() / factor
    } else {
        value
    };

    // Covers negative zero as well.
    if rounded == 0.0 {
        return "0".to_string();
    }

    format!("{rounded}")
}

fn to_exponential(value: f64, precision: usize) -> String {
    let rendered = format!("{value:.precision$e}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => rendered,
    }
}
