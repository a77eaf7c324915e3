//! Input validation performed before anything reaches the engine.
//!
//! `validate_expression` is a syntactic filter only: it guarantees balanced parentheses and
//! a restricted alphabet, not that the expression evaluates. Strings such as `1//2` or `()`
//! pass here and are rejected by [`crate::expression::evaluate_expression`].

use regex::Regex;
use std::sync::LazyLock;

use crate::model::ValidationOutcome;

pub const BASIC_OPERATIONS: [&str; 4] = ["+", "-", "*", "/"];

pub const SCIENTIFIC_OPERATIONS: [&str; 8] =
    ["sin", "cos", "tan", "log", "ln", "sqrt", "pow", "exp"];

static EXPRESSION_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\-*/().\s]+$").expect("valid expression charset"));

/// True if `value` is a real, finite number.
pub fn is_valid_number(value: f64) -> bool {
    value.is_finite()
}

pub fn is_valid_basic_operation(operation: &str) -> bool {
    BASIC_OPERATIONS.contains(&operation)
}

/// Case-insensitive membership in [`SCIENTIFIC_OPERATIONS`].
pub fn is_valid_scientific_operation(operation: &str) -> bool {
    let operation = operation.to_lowercase();
    SCIENTIFIC_OPERATIONS.contains(&operation.as_str())
}

/// True if every character of `expression` belongs to the arithmetic alphabet.
pub fn has_valid_charset(expression: &str) -> bool {
    EXPRESSION_CHARSET.is_match(expression)
}

pub fn validate_expression(expression: &str) -> ValidationOutcome {
    if expression.is_empty() {
        return ValidationOutcome::invalid("Expression must be a non-empty string");
    }

    let cleaned: String = expression.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return ValidationOutcome::invalid("Expression cannot be empty");
    }

    let mut depth: i64 = 0;
    for c in cleaned.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return ValidationOutcome::invalid("Unbalanced parentheses");
        }
    }

    if depth != 0 {
        return ValidationOutcome::invalid("Unbalanced parentheses");
    }

    if !has_valid_charset(&cleaned) {
        return ValidationOutcome::invalid("Invalid characters in expression");
    }

    ValidationOutcome::valid()
}
