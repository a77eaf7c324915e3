use crate::prelude::{eprintln, *};
use calculator_core::history::DEFAULT_HISTORY_LIMIT;
use calculator_core::input::NumberInput;
use calculator_core::Mode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::{CallToolResult, JsonRpcError};
use crate::service::CalculationService;

fn parse_args<T: DeserializeOwned>(arguments: Option<serde_json::Value>) -> Result<T, JsonRpcError> {
    serde_json::from_value(arguments.unwrap_or_else(|| json!({})))
        .map_err(|e| JsonRpcError::invalid_params(f!("Invalid arguments: {e}")))
}

/// Maps a service outcome onto a tool result; failures become `isError` content.
fn tool_result<T: serde::Serialize>(
    outcome: Result<T, Error>,
) -> Result<CallToolResult, JsonRpcError> {
    match outcome {
        Ok(value) => CallToolResult::json(&value),
        Err(e) => Ok(CallToolResult::error(e.to_string())),
    }
}

pub fn handle_calculate(
    arguments: Option<serde_json::Value>,
    service: &CalculationService,
    global: &crate::Global,
) -> Result<CallToolResult, JsonRpcError> {
    #[derive(Deserialize)]
    struct CalculateArgs {
        expression: String,
        mode: Option<String>,
    }

    let args: CalculateArgs = parse_args(arguments)?;

    if global.verbose {
        eprintln!(
            "Calling calculate: expression={}, mode={:?}",
            args.expression, args.mode
        );
    }

    let mode = match args.mode.as_deref().map(str::parse::<Mode>).transpose() {
        Ok(mode) => mode.unwrap_or_default(),
        Err(e) => return Ok(CallToolResult::error(e.to_string())),
    };

    tool_result(service.process_calculation(&args.expression, mode))
}

pub fn handle_calculate_scientific(
    arguments: Option<serde_json::Value>,
    service: &CalculationService,
    global: &crate::Global,
) -> Result<CallToolResult, JsonRpcError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ScientificArgs {
        value: NumberInput,
        operation: String,
        second_value: Option<NumberInput>,
    }

    let args: ScientificArgs = parse_args(arguments)?;

    if global.verbose {
        eprintln!(
            "Calling calculate_scientific: operation={}, value={:?}, secondValue={:?}",
            args.operation, args.value, args.second_value
        );
    }

    tool_result(service.process_scientific_calculation(
        args.value.to_f64(),
        &args.operation,
        args.second_value.as_ref().map(NumberInput::to_f64),
    ))
}

pub async fn handle_calculation_history(
    arguments: Option<serde_json::Value>,
    service: &CalculationService,
    global: &crate::Global,
) -> Result<CallToolResult, JsonRpcError> {
    #[derive(Deserialize)]
    struct HistoryArgs {
        limit: Option<usize>,
    }

    let args: HistoryArgs = parse_args(arguments)?;
    let limit = args
        .limit
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_HISTORY_LIMIT);

    if global.verbose {
        eprintln!("Calling calculation_history: limit={limit}");
    }

    tool_result(service.get_calculation_history(limit).await)
}

pub async fn handle_cleanup_history(
    service: &CalculationService,
    global: &crate::Global,
) -> Result<CallToolResult, JsonRpcError> {
    if global.verbose {
        eprintln!("Calling cleanup_history");
    }

    tool_result(
        service
            .cleanup_history()
            .await
            .map(|deleted| json!({ "deleted": deleted })),
    )
}
