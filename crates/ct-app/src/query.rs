//! Query helpers for extracting data from loaded runs.

use ct_results::{RunManifest, TimeseriesRecord};
use ct_sim::{RequiredVoltages, SaturationVerdict};

use crate::error::{AppError, AppResult};

/// Variable names accepted by [`extract_series`].
pub const SERIES_VARIABLES: [&str; 6] = [
    "flux_wb_turns",
    "i_ideal_a",
    "i_exc_a",
    "i_real_a",
    "rms_a",
    "v_req_v",
];

/// Summary of a run's time range and headline figures.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub record_count: usize,
    pub verdict: SaturationVerdict,
    pub v_sat_v: f64,
    pub peak_flux_wb_turns: f64,
    pub peak_i_real_a: f64,
    pub required: Option<RequiredVoltages>,
}

pub fn get_run_summary(
    manifest: &RunManifest,
    records: &[TimeseriesRecord],
) -> AppResult<RunSummary> {
    if records.is_empty() {
        return Err(AppError::InvalidInput("No records in run".to_string()));
    }

    let t_min = records.first().map(|r| r.t_s).unwrap_or(0.0);
    let t_max = records.last().map(|r| r.t_s).unwrap_or(0.0);
    let peak = |f: fn(&TimeseriesRecord) -> f64| {
        records.iter().map(|r| f(r).abs()).fold(0.0, f64::max)
    };

    Ok(RunSummary {
        time_range: (t_min, t_max),
        record_count: records.len(),
        verdict: manifest.verdict,
        v_sat_v: manifest.v_sat_v,
        peak_flux_wb_turns: peak(|r| r.flux_wb_turns),
        peak_i_real_a: peak(|r| r.i_real_a),
        required: manifest.required,
    })
}

/// Extract a `(time, value)` series for one state variable.
///
/// Short aliases (`flux`, `i_s`, `rms`, ...) are accepted alongside the
/// column names.
pub fn extract_series(
    records: &[TimeseriesRecord],
    variable: &str,
) -> AppResult<Vec<(f64, f64)>> {
    let pick: fn(&TimeseriesRecord) -> f64 = match variable {
        "flux_wb_turns" | "flux" => |r| r.flux_wb_turns,
        "i_ideal_a" | "i_ideal" => |r| r.i_ideal_a,
        "i_exc_a" | "i_exc" | "i_e" => |r| r.i_exc_a,
        "i_real_a" | "i_real" | "i_s" => |r| r.i_real_a,
        "rms_a" | "rms" => |r| r.rms_a,
        "v_req_v" | "v_req" => |r| r.v_req_v,
        _ => {
            return Err(AppError::InvalidInput(format!(
                "Unknown variable: {} (expected one of {})",
                variable,
                SERIES_VARIABLES.join(", ")
            )));
        }
    };

    Ok(records.iter().map(|r| (r.t_s, pick(r))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_results::RunInfo;

    fn record(step: usize, flux: f64, i_real: f64) -> TimeseriesRecord {
        TimeseriesRecord {
            step,
            t_s: step as f64 * 1e-3,
            flux_wb_turns: flux,
            i_ideal_a: i_real,
            i_exc_a: 0.0,
            i_real_a: i_real,
            rms_a: 0.0,
            rms_provisional: true,
            v_req_v: i_real.abs() * 1.5,
        }
    }

    fn manifest() -> RunManifest {
        RunManifest {
            run_id: "r".to_string(),
            case_id: "c".to_string(),
            timestamp: String::new(),
            solver_version: "0".to_string(),
            run_info: RunInfo {
                dt_s: 1e-3,
                samples_per_cycle: 3,
                cycles: 1,
                steps: 3,
            },
            verdict: SaturationVerdict::NotSaturated,
            v_sat_v: 100.0,
            required: None,
            warnings: Vec::new(),
            stopped_early: false,
        }
    }

    #[test]
    fn summary_reports_peaks_and_range() {
        let records = vec![record(0, 0.0, 0.0), record(1, -0.4, 2.0), record(2, 0.3, -3.0)];
        let summary = get_run_summary(&manifest(), &records).unwrap();
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.time_range, (0.0, 2e-3));
        assert_eq!(summary.peak_flux_wb_turns, 0.4);
        assert_eq!(summary.peak_i_real_a, 3.0);
    }

    #[test]
    fn empty_run_has_no_summary() {
        assert!(get_run_summary(&manifest(), &[]).is_err());
    }

    #[test]
    fn series_by_name_and_alias() {
        let records = vec![record(0, 0.1, 1.0), record(1, 0.2, 2.0)];
        let flux = extract_series(&records, "flux").unwrap();
        assert_eq!(flux, vec![(0.0, 0.1), (1e-3, 0.2)]);
        assert_eq!(
            extract_series(&records, "i_s").unwrap(),
            extract_series(&records, "i_real_a").unwrap()
        );
        for name in SERIES_VARIABLES {
            assert_eq!(extract_series(&records, name).unwrap().len(), 2);
        }
        assert!(matches!(
            extract_series(&records, "pressure"),
            Err(AppError::InvalidInput(_))
        ));
    }
}
