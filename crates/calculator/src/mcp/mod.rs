mod cli;
mod stdio;
mod tools;

pub use cli::App;

use crate::prelude::*;
use crate::service::CalculationService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// JSON-RPC 2.0 types
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    fn new(code: i32, message: String) -> Self {
        Self {
            code,
            message,
            data: None,
        }
    }

    pub fn invalid_params(message: String) -> Self {
        Self::new(-32602, message)
    }

    pub fn internal(message: String) -> Self {
        Self::new(-32603, message)
    }
}

// MCP Protocol types
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

pub async fn run(app: App, service: Arc<CalculationService>, global: &crate::Global) -> Result<()> {
    match app.command {
        cli::Commands::Stdio => stdio::run_stdio(&service, global).await,
    }
}

pub async fn handle_request(
    request_str: &str,
    service: &CalculationService,
    global: &crate::Global,
) -> JsonRpcResponse {
    let request: JsonRpcRequest = match serde_json::from_str(request_str) {
        Ok(req) => req,
        Err(e) => {
            return JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: None,
                result: None,
                error: Some(JsonRpcError::new(-32700, f!("Parse error: {e}"))),
            };
        }
    };

    let result = match request.method.as_str() {
        "initialize" => tools::handle_initialize(),
        "tools/list" => tools::handle_tools_list(),
        "tools/call" => tools::handle_tools_call(request.params, service, global).await,
        method => Err(JsonRpcError::new(-32601, f!("Method not found: {method}"))),
    };

    match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        },
        Err(error) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: None,
            error: Some(error),
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::service::tests::in_memory;
    use serde_json::{json, Value};

    pub(crate) fn global() -> crate::Global {
        crate::Global {
            database: crate::store::IN_MEMORY.to_string(),
            verbose: false,
        }
    }

    pub(crate) async fn call(service: &CalculationService, request: Value) -> Value {
        let response = handle_request(&request.to_string(), service, &global()).await;
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_reports_server_info() {
        let (service, _, _worker) = in_memory();
        let response = call(
            &service,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}),
        )
        .await;

        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["serverInfo"]["name"], "calculator");
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert!(response.get("error").is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let (service, _, _worker) = in_memory();
        let response = call(
            &service,
            json!({"jsonrpc": "2.0", "id": "a", "method": "resources/list"}),
        )
        .await;

        assert_eq!(response["id"], "a");
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(
            response["error"]["message"],
            "Method not found: resources/list"
        );
    }

    #[tokio::test]
    async fn test_parse_error() {
        let (service, _, _worker) = in_memory();
        let response = handle_request("{oops", &service, &global()).await;
        let response = serde_json::to_value(response).unwrap();

        assert_eq!(response["error"]["code"], -32700);
        assert!(response["id"].is_null());
    }
}
