//! Error types for the ct-app service layer.

/// Application error type wrapping the backend crates' errors behind one
/// interface for the frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Study error: {0}")]
    Study(String),

    #[error("Study validation failed: {0}")]
    Validation(String),

    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("Simulation error: {0}")]
    Simulation(#[from] ct_sim::SimError),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<ct_study::StudyError> for AppError {
    fn from(err: ct_study::StudyError) -> Self {
        AppError::Study(err.to_string())
    }
}

impl From<ct_study::ValidationError> for AppError {
    fn from(err: ct_study::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ct_results::ResultsError> for AppError {
    fn from(err: ct_results::ResultsError) -> Self {
        match err {
            ct_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            ct_results::ResultsError::InvalidRunId { run_id } => {
                AppError::InvalidInput(format!("not a run id: {run_id:?}"))
            }
            other => AppError::Results(other.to_string()),
        }
    }
}
