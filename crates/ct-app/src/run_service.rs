//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use ct_results::{RunInfo, RunManifest, RunStore, TimeseriesRecord};
use ct_sim::CancelFlag;
use ct_study::CaseDef;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage};
use crate::study_service;

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
    /// Overrides the case's own `stop_on_saturation` when set.
    pub stop_on_saturation: Option<bool>,
    pub cancel: Option<CancelFlag>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
            stop_on_saturation: None,
            cancel: None,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub study_path: &'a Path,
    pub case_id: &'a str,
    pub options: RunOptions,
}

/// Concise timing and execution summary for a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub simulate_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
    pub steps: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

type ProgressCallback<'a> = Option<&'a mut dyn FnMut(RunProgressEvent)>;

fn emit_progress(
    progress_cb: &mut ProgressCallback<'_>,
    case_id: &str,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            case_id,
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    emit_progress(
        &mut progress_cb,
        request.case_id,
        RunStage::LoadingStudy,
        started,
        Some("Loading study".to_string()),
    );

    let study = study_service::load_study(request.study_path)?;
    let case = study_service::get_case(&study, request.case_id)?;
    let store = RunStore::for_study(request.study_path)?;

    ensure_case_run(&store, case, &request.options, started, progress_cb)
}

/// Cache-aware execution of one case against an already opened store.
pub(crate) fn ensure_case_run(
    store: &RunStore,
    case: &CaseDef,
    options: &RunOptions,
    started: Instant,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<RunResponse> {
    let mut timing = RunTimingSummary::default();

    let mut sim_options = case.options.clone();
    if let Some(stop) = options.stop_on_saturation {
        sim_options.stop_on_saturation = stop;
    }

    emit_progress(
        &mut progress_cb,
        &case.id,
        RunStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
    );
    let run_id = ct_results::compute_run_id(
        &case.id,
        &case.params,
        &sim_options,
        &options.solver_version,
    );

    if options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            &case.id,
            RunStage::LoadingCachedResult,
            started,
            Some("Loading cached run".to_string()),
        );
        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
        timing.total_time_s = started.elapsed().as_secs_f64();
        timing.steps = manifest.run_info.steps;

        debug!(case_id = %case.id, %run_id, "served run from cache");
        emit_progress(&mut progress_cb, &case.id, RunStage::Completed, started, None);
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    emit_progress(
        &mut progress_cb,
        &case.id,
        RunStage::Simulating,
        started,
        Some(format!("Simulating case '{}'", case.id)),
    );
    let sim_started = Instant::now();
    let result = match &options.cancel {
        Some(flag) => ct_sim::run_cancellable(&case.params, &sim_options, flag)?,
        None => ct_sim::run(&case.params, &sim_options)?,
    };
    timing.simulate_time_s = sim_started.elapsed().as_secs_f64();
    timing.steps = result.states.len();

    let manifest = RunManifest {
        run_id: run_id.clone(),
        case_id: case.id.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        solver_version: options.solver_version.clone(),
        run_info: RunInfo {
            dt_s: result.dt_s,
            samples_per_cycle: result.samples_per_cycle,
            cycles: result.cycles,
            steps: result.states.len(),
        },
        verdict: result.verdict,
        v_sat_v: result.v_sat_v,
        required: result.required_voltages(),
        warnings: result.warnings.clone(),
        stopped_early: result.stopped_early,
    };

    emit_progress(
        &mut progress_cb,
        &case.id,
        RunStage::SavingResults,
        started,
        Some("Saving results".to_string()),
    );
    let save_started = Instant::now();
    store.save_run(&manifest, &result.states)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        case_id = %case.id,
        %run_id,
        verdict = %manifest.verdict,
        steps = timing.steps,
        "run complete"
    );
    emit_progress(&mut progress_cb, &case.id, RunStage::Completed, started, None);

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

/// Load a stored run's manifest and timeseries.
pub fn load_run(
    study_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<TimeseriesRecord>)> {
    let store = RunStore::for_study(study_path)?;
    let manifest = store.load_manifest(run_id)?;
    let records = store.load_timeseries(run_id)?;
    Ok((manifest, records))
}

/// List stored runs for one case, oldest first.
pub fn list_runs(study_path: &Path, case_id: &str) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_study(study_path)?;
    Ok(store.list_runs(case_id)?)
}

/// Drop all but the `keep` newest stored runs of a case; returns removed ids.
pub fn prune_runs(study_path: &Path, case_id: &str, keep: usize) -> AppResult<Vec<String>> {
    let store = RunStore::for_study(study_path)?;
    let removed = store.prune_runs(case_id, keep)?;
    info!(case_id, keep, removed = removed.len(), "pruned cached runs");
    Ok(removed)
}
