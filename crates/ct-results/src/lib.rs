//! ct-results: run cache, timeseries storage, and tabular export.

pub mod export;
pub mod hash;
pub mod store;
pub mod types;

pub use export::{CSV_COLUMNS, to_csv_string, write_csv};
pub use hash::compute_run_id;
pub use store::{RunStore, is_valid_run_id};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Invalid run id: {run_id:?}")]
    InvalidRunId { run_id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },
}
