use ct_results::{CSV_COLUMNS, RunInfo, RunManifest, to_csv_string};
use ct_sim::{ParameterSet, SaturationVerdict, SimOptions};

fn run_default() -> (RunManifest, ct_sim::SimulationResult) {
    let options = SimOptions {
        deviation_threshold: None,
        ..SimOptions::default()
    };
    let result = ct_sim::run(&ParameterSet::default(), &options).expect("simulation failed");
    let manifest = RunManifest {
        run_id: "abc".to_string(),
        case_id: "reference".to_string(),
        timestamp: "2026-02-26T00:00:00Z".to_string(),
        solver_version: "0.1.0".to_string(),
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
    (manifest, result)
}

#[test]
fn header_carries_metadata_and_verdict() {
    let (manifest, result) = run_default();
    let csv = to_csv_string(&manifest, &result.states).expect("export");
    let mut lines = csv.lines();

    assert_eq!(lines.next(), Some("# run_id=abc"));
    assert_eq!(lines.next(), Some("# case_id=reference"));
    assert_eq!(lines.next(), Some(format!("# v_sat_v={}", result.v_sat_v).as_str()));
    let verdict_line = lines.next().expect("verdict line");
    if manifest.verdict == SaturationVerdict::NotSaturated {
        assert_eq!(verdict_line, "# verdict=not_saturated");
    } else {
        assert!(verdict_line.starts_with("# verdict=saturated step="));
    }
    assert_eq!(lines.next(), Some(CSV_COLUMNS.join(",").as_str()));
    assert_eq!(lines.count(), result.states.len());
}

#[test]
fn values_parse_back_exactly() {
    let (manifest, result) = run_default();
    let csv = to_csv_string(&manifest, &result.states).expect("export");

    let rows: Vec<&str> = csv
        .lines()
        .filter(|l| !l.starts_with('#'))
        .skip(1)
        .collect();
    assert_eq!(rows.len(), result.states.len());

    for (row, state) in rows.iter().zip(&result.states) {
        let cols: Vec<&str> = row.split(',').collect();
        assert_eq!(cols.len(), CSV_COLUMNS.len());
        assert_eq!(cols[0].parse::<usize>().unwrap(), state.step);
        assert_eq!(cols[1].parse::<f64>().unwrap(), state.t_s);
        assert_eq!(cols[2].parse::<f64>().unwrap(), state.flux_wb_turns);
        assert_eq!(cols[3].parse::<f64>().unwrap(), state.i_ideal_a);
        assert_eq!(cols[4].parse::<f64>().unwrap(), state.i_exc_a);
        assert_eq!(cols[5].parse::<f64>().unwrap(), state.i_real_a);
        assert_eq!(cols[6].parse::<f64>().unwrap(), state.rms_a);
        assert_eq!(cols[7].parse::<bool>().unwrap(), state.rms_provisional);
        assert_eq!(cols[8].parse::<f64>().unwrap(), state.v_req_v);
    }
}
