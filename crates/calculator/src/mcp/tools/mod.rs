mod calculator;

use serde::{Deserialize, Serialize};

use crate::service::CalculationService;

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    /// Successful result carrying `value` as pretty-printed JSON text.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, JsonRpcError> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| JsonRpcError::internal(format!("Serialization error: {e}")))?;

        Ok(Self {
            content: vec![Content::Text { text }],
            is_error: None,
        })
    }

    /// Tool-level failure. The protocol call itself still succeeds.
    pub fn error(message: String) -> Self {
        Self {
            content: vec![Content::Text { text: message }],
            is_error: Some(true),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

fn to_value<T: Serialize>(value: T) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    to_value(InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let tools = vec![
        Tool {
            name: "calculate".to_string(),
            description: "Evaluate an arithmetic expression using + - * /, parentheses and decimal numbers. Returns the numeric result, the formatted result (10 decimal places at most, exponential notation for very large or very small magnitudes) and the mode. The calculation is recorded in history.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "expression": {
                        "type": "string",
                        "description": "Arithmetic expression, e.g. '(2+3)*4'"
                    },
                    "mode": {
                        "type": "string",
                        "description": "Mode recorded with the calculation (default: standard)",
                        "enum": ["standard", "scientific"]
                    }
                },
                "required": ["expression"]
            }),
        },
        Tool {
            name: "calculate_scientific".to_string(),
            description: "Apply a scientific function to a number. Supported operations: sin, cos, tan (radians), log (base 10), ln, sqrt, pow (requires secondValue as the exponent) and exp. The calculation is recorded in history as e.g. 'pow(2, 10)'.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "value": {
                        "type": ["number", "string"],
                        "description": "Input value"
                    },
                    "operation": {
                        "type": "string",
                        "description": "Function name",
                        "enum": ["sin", "cos", "tan", "log", "ln", "sqrt", "pow", "exp"]
                    },
                    "secondValue": {
                        "type": ["number", "string"],
                        "description": "Exponent for pow"
                    }
                },
                "required": ["value", "operation"]
            }),
        },
        Tool {
            name: "calculation_history".to_string(),
            description: "List calculations from the last two days, newest first.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of calculations to return (default: 50)"
                    }
                },
                "required": []
            }),
        },
        Tool {
            name: "cleanup_history".to_string(),
            description: "Delete calculations older than two days and return how many were removed.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
    ];

    to_value(ToolsList { tools })
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    service: &CalculationService,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))?;

    let result = match params.name.as_str() {
        "calculate" => calculator::handle_calculate(params.arguments, service, global)?,
        "calculate_scientific" => {
            calculator::handle_calculate_scientific(params.arguments, service, global)?
        }
        "calculation_history" => {
            calculator::handle_calculation_history(params.arguments, service, global).await?
        }
        "cleanup_history" => calculator::handle_cleanup_history(service, global).await?,
        _ => {
            return Err(JsonRpcError::invalid_params(format!(
                "Unknown tool: {}",
                params.name
            )))
        }
    };

    to_value(result)
}
