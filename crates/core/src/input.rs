//! Lenient parsing of loosely-typed transport input.
//!
//! HTTP clients send numbers either as JSON numbers or as strings typed into a form, and
//! history limits arrive as raw query strings. These helpers turn both into typed values
//! without failing on trailing garbage.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::history::DEFAULT_HISTORY_LIMIT;

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid float prefix")
});

static INT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("valid integer prefix"));

/// A number as received on the wire: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// Returns the numeric value, or `NaN` when nothing numeric can be read.
    pub fn to_f64(&self) -> f64 {
        match self {
            NumberInput::Number(n) => *n,
            NumberInput::Text(s) => parse_float(s).unwrap_or(f64::NAN),
        }
    }
}

/// Reads the longest numeric prefix of `input`, ignoring leading whitespace.
///
/// `"12.5px"` reads as `12.5`; `"Infinity"` reads as infinity; `"abc"` is `None`.
pub fn parse_float(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();

    for (literal, value) in [
        ("Infinity", f64::INFINITY),
        ("+Infinity", f64::INFINITY),
        ("-Infinity", f64::NEG_INFINITY),
    ] {
        if trimmed.starts_with(literal) {
            return Some(value);
        }
    }

    FLOAT_PREFIX
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Parses a history limit; missing, non-numeric, zero or negative input yields the default.
pub fn parse_history_limit(input: Option<&str>) -> usize {
    input
        .and_then(|raw| INT_PREFIX.find(raw.trim_start()))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .filter(|limit| *limit > 0)
        .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
}
