use serde::{Deserialize, Serialize};

/// Failure conditions raised by the validator and the engine.
///
/// Every variant renders a human-readable message through `Display`; callers surface that
/// message to the client unchanged.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CalcError {
    /// Bad input shape: empty expression, stray characters, non-finite operand.
    #[error("{0}")]
    Validation(String),

    #[error("Division by zero")]
    DivisionByZero,

    /// Mathematically undefined input (logarithm of a non-positive number, etc).
    #[error("{0}")]
    Domain(String),

    /// `pow` without a usable second operand. Holds the operation name.
    #[error("{0} operation requires second value")]
    MissingOperand(String),

    #[error("Invalid scientific operation: {0}")]
    UnsupportedOperation(String),

    /// Operator outside `+ - * /` given to `calculate_basic`.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Character-valid but unevaluable expression, or a non-finite result.
    #[error("{0}")]
    Evaluation(String),
}

impl CalcError {
    /// True for conditions that are undefined in real arithmetic.
    pub fn is_domain(&self) -> bool {
        matches!(self, CalcError::DivisionByZero | CalcError::Domain(_))
    }
}

pub type CalcResult<T> = Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_by_zero_is_domain() {
        assert!(CalcError::DivisionByZero.is_domain());
        assert!(CalcError::Domain("x".to_string()).is_domain());
        assert!(!CalcError::Evaluation("x".to_string()).is_domain());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            CalcError::MissingOperand("Power".to_string()).to_string(),
            "Power operation requires second value"
        );
        assert_eq!(
            CalcError::UnsupportedOperation("foo".to_string()).to_string(),
            "Invalid scientific operation: foo"
        );
        assert_eq!(CalcError::DivisionByZero.to_string(), "Division by zero");
    }
}
