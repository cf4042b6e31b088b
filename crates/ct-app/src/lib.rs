//! Shared application service layer for ctsat.
//!
//! Frontends go through this crate for study loading, cached run
//! execution, parallel batches, and result queries.

pub mod batch;
pub mod error;
pub mod progress;
pub mod query;
pub mod run_service;
pub mod study_service;

pub use batch::{BatchOutcome, run_batch};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage};
pub use query::{RunSummary, SERIES_VARIABLES, extract_series, get_run_summary};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, ensure_run, ensure_run_with_progress,
    list_runs, load_run, prune_runs,
};
pub use study_service::{CaseSummary, get_case, list_cases, load_study, validate_study};
