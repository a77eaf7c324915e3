//! Core library for the calculator service
//!
//! This crate implements the **Functional Core** of the calculator, following the
//! Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`calculator_core`** (this crate): validation, evaluation and formatting with zero I/O
//! - **`calculator`**: history storage, HTTP/CLI/MCP transports and orchestration
//!   (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Safe evaluation**: Expressions go through an explicit parser restricted to
//!   `0-9 + - * / ( ) .` and whitespace; nothing is ever handed to a code interpreter
//!
//! # Module Organization
//!
//! - [`validator`]: syntactic checks run before evaluation
//! - [`expression`]: tokenizer and recursive-descent evaluator for arithmetic expressions
//! - [`engine`]: binary arithmetic and scientific functions
//! - [`format`]: display formatting of results
//! - [`history`]: retention window arithmetic and history labels
//! - [`input`]: lenient parsing of numbers and limits coming from transports
//! - [`model`]: request, result and history record types
//!
//! # Example Usage
//!
//! ```rust
//! use calculator_core::{evaluate_expression, format_number, validate_expression};
//!
//! assert!(validate_expression("(2+3)*4").is_valid);
//! let value = evaluate_expression("(2+3)*4").unwrap();
//! assert_eq!(format_number(value), "20");
//! ```

pub mod engine;
pub mod error;
pub mod expression;
pub mod format;
pub mod history;
pub mod input;
pub mod model;
pub mod validator;

pub use engine::{calculate_basic, calculate_scientific};
pub use error::{CalcError, CalcResult};
pub use expression::evaluate_expression;
pub use format::{format_number, format_number_with_precision};
pub use model::{
    CalculationRequest, CalculationResult, HistoryRecord, Mode, NewCalculation,
    ValidationOutcome,
};
pub use validator::{
    is_valid_basic_operation, is_valid_number, is_valid_scientific_operation,
    validate_expression,
};
