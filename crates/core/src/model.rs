//! Request, result and history types shared by every transport.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalcError;

/// Calculation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Standard,
    Scientific,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Scientific => "scientific",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Mode::Standard),
            "scientific" => Ok(Mode::Scientific),
            other => Err(CalcError::Validation(format!("Invalid mode: {other}"))),
        }
    }
}

/// Incoming request, in either of its two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalculationRequest {
    Expression {
        expression: String,
        #[serde(default)]
        mode: Mode,
    },
    #[serde(rename_all = "camelCase")]
    Scientific {
        value: f64,
        operation: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second_value: Option<f64>,
    },
}

/// Evaluated calculation as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub expression: String,
    pub result: f64,
    pub formatted_result: String,
    pub mode: Mode,
}

/// Outcome of the syntactic expression filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }

    /// Converts an invalid outcome into a `CalcError::Validation`.
    pub fn into_result(self) -> Result<(), CalcError> {
        match (self.is_valid, self.error) {
            (true, _) => Ok(()),
            (false, Some(error)) => Err(CalcError::Validation(error)),
            (false, None) => Err(CalcError::Validation("Invalid expression".to_string())),
        }
    }
}

/// A calculation waiting to be written to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCalculation {
    pub expression: String,
    /// Formatted result, stored as display text.
    pub result: String,
    pub mode: Mode,
}

impl From<&CalculationResult> for NewCalculation {
    fn from(value: &CalculationResult) -> Self {
        Self {
            expression: value.expression.clone(),
            result: value.formatted_result.clone(),
            mode: value.mode,
        }
    }
}

/// A persisted history row, serialized with the column names of the history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub expression: String,
    pub result: String,
    pub mode: Mode,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
}
