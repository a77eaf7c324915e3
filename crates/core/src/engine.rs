//! Binary arithmetic and scientific functions.

use crate::error::{CalcError, CalcResult};
use crate::validator::is_valid_number;

/// Applies `+ - * /` to two finite operands.
pub fn calculate_basic(a: f64, b: f64, operation: &str) -> CalcResult<f64> {
    if !is_valid_number(a) || !is_valid_number(b) {
        return Err(CalcError::Validation(
            "Invalid operands: must be numbers".to_string(),
        ));
    }

    let result = match operation {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" => {
            if b == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            a / b
        }
        other => return Err(CalcError::InvalidOperation(other.to_string())),
    };

    finite(result)
}

/// Dispatches on the lower-cased operation name.
///
/// Trigonometric functions take radians. `second_value` is only read by `pow`.
pub fn calculate_scientific(
    value: f64,
    operation: &str,
    second_value: Option<f64>,
) -> CalcResult<f64> {
    if !is_valid_number(value) {
        return Err(CalcError::Validation(
            "Invalid value: must be a number".to_string(),
        ));
    }

    let result = match operation.to_lowercase().as_str() {
        "sin" => value.sin(),
        "cos" => value.cos(),
        "tan" => value.tan(),
        "log" => {
            if value <= 0.0 {
                return Err(CalcError::Domain(
                    "Logarithm of non-positive number".to_string(),
                ));
            }
            value.log10()
        }
        "ln" => {
            if value <= 0.0 {
                return Err(CalcError::Domain(
                    "Natural logarithm of non-positive number".to_string(),
                ));
            }
            value.ln()
        }
        "sqrt" => {
            if value < 0.0 {
                return Err(CalcError::Domain(
                    "Square root of negative number".to_string(),
                ));
            }
            value.sqrt()
        }
        "pow" => match second_value {
            Some(exponent) if is_valid_number(exponent) => value.powf(exponent),
            _ => return Err(CalcError::MissingOperand("Power".to_string())),
        },
        "exp" => value.exp(),
        _ => return Err(CalcError::UnsupportedOperation(operation.to_string())),
    };

    finite(result)
}

fn finite(result: f64) -> CalcResult<f64> {
    if result.is_finite() {
        Ok(result)
    } else {
        Err(CalcError::Evaluation("Invalid calculation result".to_string()))
    }
}
