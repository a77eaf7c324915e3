use calculator_core::CalcError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Rejected before evaluation. The message is surfaced unchanged.
    #[error("{0}")]
    Invalid(CalcError),

    #[error("Calculation failed: {0}")]
    Calculation(CalcError),

    #[error("Scientific calculation failed: {0}")]
    ScientificCalculation(CalcError),

    #[error("Failed to retrieve history: {0}")]
    HistoryRead(String),

    #[error("Failed to cleanup history: {0}")]
    HistoryCleanup(String),
}

impl Error {
    /// True when the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Invalid(_) | Error::Calculation(_) | Error::ScientificCalculation(_)
        )
    }
}
