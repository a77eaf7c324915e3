use crate::prelude::{eprintln, println, *};
use calculator_core::{CalculationResult, Mode};
use colored::Colorize;

use crate::service::CalculationService;

#[derive(Debug, clap::Args, Clone)]
pub struct EvalOptions {
    /// Arithmetic expression, e.g. "(2+3)*4"
    #[arg(value_name = "EXPRESSION", allow_hyphen_values = true)]
    pub expression: String,

    /// Calculation mode recorded in history
    #[arg(short, long, default_value = "standard")]
    pub mode: Mode,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct SciOptions {
    /// Function name: sin, cos, tan, log, ln, sqrt, pow, exp
    #[arg(value_name = "OPERATION")]
    pub operation: String,

    /// Input value (radians for trigonometric functions)
    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    pub value: f64,

    /// Exponent for pow
    #[arg(value_name = "SECOND", allow_hyphen_values = true)]
    pub second_value: Option<f64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run_eval(
    options: EvalOptions,
    service: &CalculationService,
    global: &crate::Global,
) -> Result<()> {
    if global.verbose {
        eprintln!("Evaluating '{}' ({} mode)", options.expression, options.mode);
    }

    let result = service.process_calculation(&options.expression, options.mode)?;
    print_result(&result, options.json)
}

pub fn run_sci(
    options: SciOptions,
    service: &CalculationService,
    global: &crate::Global,
) -> Result<()> {
    if global.verbose {
        eprintln!(
            "Applying {} to {} (second value: {:?})",
            options.operation, options.value, options.second_value
        );
    }

    let result = service.process_scientific_calculation(
        options.value,
        &options.operation,
        options.second_value,
    )?;
    print_result(&result, options.json)
}

fn print_result(result: &CalculationResult, json: bool) -> Result<()> {
    if json {
        println!("{}", format_result_json(result)?);
    } else {
        println!("{}", format_result_text(result));
    }

    Ok(())
}

fn format_result_json(result: &CalculationResult) -> Result<String> {
    serde_json::to_string_pretty(result).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn format_result_text(result: &CalculationResult) -> String {
    f!(
        "{} {} {}",
        result.expression.bright_white(),
        "=".bright_black(),
        result.formatted_result.bright_green().bold()
    )
}
