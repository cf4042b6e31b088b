//! Parallel execution of independent cases.

use std::path::Path;
use std::time::Instant;

use ct_results::RunStore;
use rayon::prelude::*;

use crate::error::AppResult;
use crate::run_service::{RunOptions, RunResponse, ensure_case_run};
use crate::study_service;

/// Outcome of one case in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub case_id: String,
    pub result: AppResult<RunResponse>,
}

/// Run the named cases (all cases when `case_ids` is empty) in parallel.
///
/// Outcomes come back in request order. A failing case does not stop
/// the others.
pub fn run_batch(
    study_path: &Path,
    case_ids: &[String],
    options: &RunOptions,
) -> AppResult<Vec<BatchOutcome>> {
    let study = study_service::load_study(study_path)?;
    study_service::validate_study(&study)?;
    let store = RunStore::for_study(study_path)?;

    let cases = if case_ids.is_empty() {
        study.cases.iter().collect::<Vec<_>>()
    } else {
        case_ids
            .iter()
            .map(|id| study_service::get_case(&study, id))
            .collect::<AppResult<Vec<_>>>()?
    };

    let outcomes = cases
        .par_iter()
        .map(|case| BatchOutcome {
            case_id: case.id.clone(),
            result: ensure_case_run(&store, case, options, Instant::now(), None),
        })
        .collect();
    Ok(outcomes)
}
