//! HTTP API.
//!
//! | Method | Path                        | Body / query                          |
//! |--------|-----------------------------|---------------------------------------|
//! | POST   | `/api/calculate`            | `{expression, mode?}`                 |
//! | POST   | `/api/calculate/scientific` | `{value, operation, secondValue?}`    |
//! | GET    | `/api/history`              | `?limit=N`                            |
//! | POST   | `/api/history/cleanup`      |                                       |
//! | GET    | `/health`                   |                                       |
//!
//! Every failure is answered with `{"error": "<message>"}`.

use crate::prelude::{eprintln, *};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use calculator_core::input::{parse_history_limit, NumberInput};
use calculator_core::Mode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::service::CalculationService;

#[derive(Debug, clap::Args, Clone)]
pub struct ServeOptions {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
}

type SharedService = Arc<CalculationService>;

pub async fn run(
    options: ServeOptions,
    service: SharedService,
    global: &crate::Global,
) -> Result<()> {
    match service.cleanup_history().await {
        Ok(0) => {}
        Ok(deleted) => log::info!("Cleaned up {deleted} old calculations"),
        Err(e) => log::error!("Startup cleanup failed: {e}"),
    }

    let addr = f!("{}:{}", options.host, options.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Calculator server listening on http://{addr}");
    if global.verbose {
        eprintln!("Calculator server listening on http://{addr}");
        eprintln!("History database: {}", global.database);
    }

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    log::info!("Calculator server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

pub fn router(service: SharedService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/calculate", post(calculate))
        .route("/api/calculate/scientific", post(calculate_scientific))
        .route("/api/history", get(history))
        .route("/api/history/cleanup", post(cleanup))
        .route("/health", get(health))
        .layer(cors)
        .with_state(service)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            log::error!("{self}");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        error_response(status, self.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct CalculateBody {
    expression: Option<Value>,
    mode: Option<String>,
}

async fn calculate(
    State(service): State<SharedService>,
    body: Result<Json<CalculateBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let expression = match body.expression {
        None | Some(Value::Null) => {
            return error_response(StatusCode::BAD_REQUEST, "Expression is required")
        }
        Some(Value::String(s)) if s.is_empty() => {
            return error_response(StatusCode::BAD_REQUEST, "Expression is required")
        }
        Some(Value::String(s)) => s,
        Some(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Expression must be a non-empty string",
            )
        }
    };

    let mode = match body.mode.as_deref().map(str::parse::<Mode>).transpose() {
        Ok(mode) => mode.unwrap_or_default(),
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match service.process_calculation(&expression, mode) {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScientificBody {
    value: Option<NumberInput>,
    operation: Option<String>,
    second_value: Option<NumberInput>,
}

async fn calculate_scientific(
    State(service): State<SharedService>,
    body: Result<Json<ScientificBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let (value, operation) = match (body.value, body.operation) {
        (Some(value), Some(operation)) if !operation.is_empty() => (value, operation),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Value and operation are required",
            )
        }
    };

    let second_value = body.second_value.as_ref().map(NumberInput::to_f64);

    match service.process_scientific_calculation(value.to_f64(), &operation, second_value) {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<String>,
}

async fn history(
    State(service): State<SharedService>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let limit = parse_history_limit(query.limit.as_deref());

    match service.get_calculation_history(limit).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn cleanup(State(service): State<SharedService>) -> Response {
    match service.cleanup_history().await {
        Ok(deleted) => Json(json!({ "deleted": deleted })).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{self, QUEUE_CAPACITY};
    use crate::service::tests::in_memory;
    use crate::store::UnavailableHistoryStore;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    async fn send(
        router: Router,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (service, _, _worker) = in_memory();
        let (status, body) = send(router(service), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_calculate() {
        let (service, _, _worker) = in_memory();
        let (status, body) = send(
            router(service),
            Method::POST,
            "/api/calculate",
            Some(r#"{"expression":"(2+3)*4"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expression"], "(2+3)*4");
        assert_eq!(body["result"], 20.0);
        assert_eq!(body["formattedResult"], "20");
        assert_eq!(body["mode"], "standard");
    }

    #[tokio::test]
    async fn test_calculate_missing_expression() {
        let (service, _, _worker) = in_memory();
        for payload in [r#"{}"#, r#"{"expression":""}"#, r#"{"expression":null}"#] {
            let (status, body) =
                send(router(service.clone()), Method::POST, "/api/calculate", Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Expression is required");
        }
    }

    #[tokio::test]
    async fn test_calculate_rejects_non_string_expression() {
        let (service, _, _worker) = in_memory();
        let (status, body) = send(
            router(service),
            Method::POST,
            "/api/calculate",
            Some(r#"{"expression":42}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Expression must be a non-empty string");
    }

    #[tokio::test]
    async fn test_calculate_failures_are_bad_requests() {
        let (service, _, _worker) = in_memory();
        let cases = [
            (r#"{"expression":"(1+2"}"#, "Unbalanced parentheses"),
            (r#"{"expression":"   "}"#, "Expression cannot be empty"),
            (r#"{"expression":"2^3"}"#, "Invalid characters in expression"),
            (
                r#"{"expression":"1/0"}"#,
                "Calculation failed: Expression evaluation failed: Invalid calculation result",
            ),
            (r#"{"expression":"1+1","mode":"graphing"}"#, "Invalid mode: graphing"),
        ];

        for (payload, message) in cases {
            let (status, body) =
                send(router(service.clone()), Method::POST, "/api/calculate", Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(body["error"], message, "{payload}");
        }
    }

    #[tokio::test]
    async fn test_calculate_malformed_json() {
        let (service, _, _worker) = in_memory();
        let (status, body) =
            send(router(service), Method::POST, "/api/calculate", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_calculate_scientific_accepts_numeric_strings() {
        let (service, _, _worker) = in_memory();
        let (status, body) = send(
            router(service),
            Method::POST,
            "/api/calculate/scientific",
            Some(r#"{"value":"2","operation":"pow","secondValue":"10"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expression"], "pow(2, 10)");
        assert_eq!(body["formattedResult"], "1024");
        assert_eq!(body["mode"], "scientific");
    }

    #[tokio::test]
    async fn test_calculate_scientific_missing_fields() {
        let (service, _, _worker) = in_memory();
        for payload in [r#"{"operation":"sin"}"#, r#"{"value":1}"#, r#"{"value":1,"operation":""}"#] {
            let (status, body) = send(
                router(service.clone()),
                Method::POST,
                "/api/calculate/scientific",
                Some(payload),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Value and operation are required");
        }
    }

    #[tokio::test]
    async fn test_calculate_scientific_failures() {
        let (service, _, _worker) = in_memory();
        let cases = [
            (r#"{"value":"abc","operation":"sin"}"#, "Invalid value: must be a number"),
            (r#"{"value":1,"operation":"cbrt"}"#, "Invalid scientific operation: cbrt"),
            (
                r#"{"value":0,"operation":"log"}"#,
                "Scientific calculation failed: Logarithm of non-positive number",
            ),
        ];

        for (payload, message) in cases {
            let (status, body) = send(
                router(service.clone()),
                Method::POST,
                "/api/calculate/scientific",
                Some(payload),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(body["error"], message, "{payload}");
        }
    }

    #[tokio::test]
    async fn test_history_returns_recorded_calculations() {
        let (service, _, worker) = in_memory();
        service.process_calculation("1+1", Mode::Standard).unwrap();
        service.process_calculation("2*3", Mode::Standard).unwrap();
        service.process_calculation("9-4", Mode::Standard).unwrap();
        worker.shutdown().await;

        let (status, body) =
            send(router(service.clone()), Method::GET, "/api/history?limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["expression"], "9-4");
        assert!(rows[0]["created_at"].is_i64());

        let (_, body) = send(router(service), Method::GET, "/api/history?limit=abc", None).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_cleanup_reports_deleted_count() {
        let (service, _, _worker) = in_memory();
        let (status, body) = send(router(service), Method::POST, "/api/history/cleanup", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "deleted": 0 }));
    }

    #[tokio::test]
    async fn test_store_failures_are_server_errors() {
        let store = Arc::new(UnavailableHistoryStore::new("offline"));
        let (recorder, _worker) = recorder::spawn(store.clone(), QUEUE_CAPACITY);
        let service = Arc::new(CalculationService::new(store, recorder));

        let (status, body) = send(router(service.clone()), Method::GET, "/api/history", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "Failed to retrieve history: History store unavailable: offline"
        );

        let (status, body) =
            send(router(service.clone()), Method::POST, "/api/history/cleanup", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to cleanup history:"));

        let (status, _) = send(
            router(service),
            Method::POST,
            "/api/calculate",
            Some(r#"{"expression":"1+1"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
