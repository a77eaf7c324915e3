//! Orchestration: validate, evaluate, format, then hand the result to history.

use calculator_core::history::{retention_cutoff, scientific_expression};
use calculator_core::{
    calculate_scientific, evaluate_expression, format_number, is_valid_number,
    is_valid_scientific_operation, validate_expression, CalcError, CalculationResult,
    HistoryRecord, Mode, NewCalculation,
};
use std::sync::Arc;

use crate::error::Error;
use crate::recorder::{self, HistoryRecorder, RecorderWorker, QUEUE_CAPACITY};
use crate::store::{HistoryStore, SqliteHistoryStore, UnavailableHistoryStore};

pub struct CalculationService {
    store: Arc<dyn HistoryStore>,
    recorder: HistoryRecorder,
}

/// Opens the configured history store and starts the recorder.
///
/// A database that cannot be opened is logged and replaced by [`UnavailableHistoryStore`]
/// so calculations keep working without history.
pub fn start(global: &crate::Global) -> (Arc<CalculationService>, RecorderWorker) {
    let store: Arc<dyn HistoryStore> = match SqliteHistoryStore::open(&global.database) {
        Ok(store) => {
            log::debug!("Opened history database at {}", global.database);
            Arc::new(store)
        }
        Err(e) => {
            log::error!(
                "Failed to open history database at {}: {e}",
                global.database
            );
            Arc::new(UnavailableHistoryStore::new(e.to_string()))
        }
    };

    let (recorder, worker) = recorder::spawn(store.clone(), QUEUE_CAPACITY);
    (Arc::new(CalculationService::new(store, recorder)), worker)
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl CalculationService {
    pub fn new(store: Arc<dyn HistoryStore>, recorder: HistoryRecorder) -> Self {
        Self { store, recorder }
    }

    /// Evaluates an arithmetic expression.
    pub fn process_calculation(
        &self,
        expression: &str,
        mode: Mode,
    ) -> Result<CalculationResult, Error> {
        validate_expression(expression)
            .into_result()
            .map_err(Error::Invalid)?;

        let result = evaluate_expression(expression).map_err(Error::Calculation)?;

        let calculation = CalculationResult {
            expression: expression.to_string(),
            result,
            formatted_result: format_number(result),
            mode,
        };

        self.recorder.record(NewCalculation::from(&calculation));

        Ok(calculation)
    }

    /// Applies a scientific function. History gets `op(value)` or `op(value, second)`.
    pub fn process_scientific_calculation(
        &self,
        value: f64,
        operation: &str,
        second_value: Option<f64>,
    ) -> Result<CalculationResult, Error> {
        if !is_valid_number(value) {
            return Err(Error::Invalid(CalcError::Validation(
                "Invalid value: must be a number".to_string(),
            )));
        }

        if !is_valid_scientific_operation(operation) {
            return Err(Error::Invalid(CalcError::UnsupportedOperation(
                operation.to_string(),
            )));
        }

        let result = calculate_scientific(value, operation, second_value)
            .map_err(Error::ScientificCalculation)?;

        let calculation = CalculationResult {
            expression: scientific_expression(operation, value, second_value),
            result,
            formatted_result: format_number(result),
            mode: Mode::Scientific,
        };

        self.recorder.record(NewCalculation::from(&calculation));

        Ok(calculation)
    }

    /// History inside the retention window, newest first.
    pub async fn get_calculation_history(&self, limit: usize) -> Result<Vec<HistoryRecord>, Error> {
        let store = self.store.clone();
        let cutoff = retention_cutoff(now_ms());

        tokio::task::spawn_blocking(move || store.get_history(limit, cutoff))
            .await
            .map_err(|e| Error::HistoryRead(e.to_string()))?
            .map_err(|e| Error::HistoryRead(e.to_string()))
    }

    /// Deletes history older than the retention window and returns the count.
    pub async fn cleanup_history(&self) -> Result<usize, Error> {
        let store = self.store.clone();
        let cutoff = retention_cutoff(now_ms());

        tokio::task::spawn_blocking(move || store.cleanup_old_calculations(cutoff))
            .await
            .map_err(|e| Error::HistoryCleanup(e.to_string()))?
            .map_err(|e| Error::HistoryCleanup(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use calculator_core::history::RETENTION_MS;

    /// Service over an in-memory database. Shut the worker down to flush writes.
    pub(crate) fn in_memory() -> (Arc<CalculationService>, Arc<SqliteHistoryStore>, RecorderWorker) {
        let store = Arc::new(SqliteHistoryStore::open_in_memory().unwrap());
        let (recorder, worker) = recorder::spawn(store.clone(), QUEUE_CAPACITY);
        let service = Arc::new(CalculationService::new(store.clone(), recorder));
        (service, store, worker)
    }

    // ============================================================================
    // process_calculation tests
    // ============================================================================

    #[tokio::test]
    async fn test_process_calculation() {
        let (service, _, _worker) = in_memory();
        let result = service.process_calculation("2+3*4", Mode::Standard).unwrap();

        assert_eq!(result.expression, "2+3*4");
        assert_eq!(result.result, 14.0);
        assert_eq!(result.formatted_result, "14");
        assert_eq!(result.mode, Mode::Standard);
    }

    #[tokio::test]
    async fn test_process_calculation_keeps_requested_mode() {
        let (service, _, _worker) = in_memory();
        let result = service.process_calculation("1+1", Mode::Scientific).unwrap();
        assert_eq!(result.mode, Mode::Scientific);
    }

    #[tokio::test]
    async fn test_process_calculation_validation_message_is_unwrapped() {
        let (service, _, _worker) = in_memory();
        let err = service
            .process_calculation("(1+2", Mode::Standard)
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Unbalanced parentheses");
    }

    #[tokio::test]
    async fn test_process_calculation_evaluation_failure_is_wrapped() {
        let (service, _, _worker) = in_memory();
        let err = service.process_calculation("1/0", Mode::Standard).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Calculation failed: Expression evaluation failed: Invalid calculation result"
        );

        let err = service.process_calculation("1//2", Mode::Standard).unwrap_err();
        assert!(err.to_string().starts_with("Calculation failed:"));
    }

    #[tokio::test]
    async fn test_process_calculation_records_history() {
        let (service, store, worker) = in_memory();
        service.process_calculation("0.1+0.2", Mode::Standard).unwrap();
        worker.shutdown().await;

        let rows = store.get_history(10, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].expression, "0.1+0.2");
        assert_eq!(rows[0].result, "0.3");
        assert_eq!(rows[0].mode, Mode::Standard);
    }

    #[tokio::test]
    async fn test_failed_calculation_is_not_recorded() {
        let (service, store, worker) = in_memory();
        let _ = service.process_calculation("1+a", Mode::Standard);
        worker.shutdown().await;

        assert!(store.get_history(10, 0).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_calculation_succeeds_when_store_fails() {
        let store = Arc::new(UnavailableHistoryStore::new("offline"));
        let (recorder, worker) = recorder::spawn(store.clone(), QUEUE_CAPACITY);
        let service = CalculationService::new(store, recorder);

        let result = service.process_calculation("(2+3)*4", Mode::Standard).unwrap();
        assert_eq!(result.result, 20.0);

        worker.shutdown().await;
        let err = service.get_calculation_history(10).await.unwrap_err();
        assert!(!err.is_client_error());
        assert!(err.to_string().starts_with("Failed to retrieve history:"));
    }

    // ============================================================================
    // process_scientific_calculation tests
    // ============================================================================

    #[tokio::test]
    async fn test_process_scientific_pow() {
        let (service, _, _worker) = in_memory();
        let result = service
            .process_scientific_calculation(2.0, "pow", Some(10.0))
            .unwrap();

        assert_eq!(result.expression, "pow(2, 10)");
        assert_eq!(result.result, 1024.0);
        assert_eq!(result.formatted_result, "1024");
        assert_eq!(result.mode, Mode::Scientific);
    }

    #[tokio::test]
    async fn test_process_scientific_single_operand_expression() {
        let (service, _, _worker) = in_memory();
        let result = service
            .process_scientific_calculation(100.0, "log", None)
            .unwrap();
        assert_eq!(result.expression, "log(100)");
        assert_eq!(result.formatted_result, "2");
    }

    #[tokio::test]
    async fn test_process_scientific_invalid_value() {
        let (service, _, _worker) = in_memory();
        let err = service
            .process_scientific_calculation(f64::NAN, "sin", None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value: must be a number");
    }

    #[tokio::test]
    async fn test_process_scientific_unknown_operation() {
        let (service, _, _worker) = in_memory();
        let err = service
            .process_scientific_calculation(1.0, "cbrt", None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid scientific operation: cbrt");
    }

    #[tokio::test]
    async fn test_process_scientific_domain_error() {
        let (service, _, _worker) = in_memory();
        let err = service
            .process_scientific_calculation(-1.0, "sqrt", None)
            .unwrap_err();
        assert!(matches!(&err, Error::ScientificCalculation(e) if e.is_domain()));
        assert_eq!(
            err.to_string(),
            "Scientific calculation failed: Square root of negative number"
        );
    }

    #[tokio::test]
    async fn test_process_scientific_missing_operand() {
        let (service, _, _worker) = in_memory();
        let err = service
            .process_scientific_calculation(2.0, "pow", None)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Scientific calculation failed: Power operation requires second value"
        );
    }

    #[tokio::test]
    async fn test_process_scientific_records_history_as_scientific() {
        let (service, store, worker) = in_memory();
        service
            .process_scientific_calculation(16.0, "SQRT", None)
            .unwrap();
        worker.shutdown().await;

        let rows = store.get_history(10, 0).unwrap();
        assert_eq!(rows[0].expression, "SQRT(16)");
        assert_eq!(rows[0].mode, Mode::Scientific);
    }

    // ============================================================================
    // history tests
    // ============================================================================

    #[tokio::test]
    async fn test_history_excludes_expired_records() {
        let (service, store, _worker) = in_memory();
        let now = now_ms();
        let entry = |expression: &str| NewCalculation {
            expression: expression.to_string(),
            result: "1".to_string(),
            mode: Mode::Standard,
        };

        store.store_calculation(&entry("fresh"), now - 1_000).unwrap();
        store
            .store_calculation(&entry("expired"), now - RETENTION_MS - 60_000)
            .unwrap();

        let history = service.get_calculation_history(50).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].expression, "fresh");
    }

    #[tokio::test]
    async fn test_cleanup_history_counts_removed_records() {
        let (service, store, _worker) = in_memory();
        let now = now_ms();
        let entry = NewCalculation {
            expression: "old".to_string(),
            result: "1".to_string(),
            mode: Mode::Standard,
        };

        store
            .store_calculation(&entry, now - RETENTION_MS - 1_000)
            .unwrap();
        store
            .store_calculation(&entry, now - RETENTION_MS - 2_000)
            .unwrap();
        store.store_calculation(&entry, now).unwrap();

        assert_eq!(service.cleanup_history().await.unwrap(), 2);
        assert_eq!(service.cleanup_history().await.unwrap(), 0);
        assert_eq!(store.get_history(50, i64::MIN).unwrap().len(), 1);
    }
}
