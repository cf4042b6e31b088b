//! Reference fault scenario: 3000/1 CT, R_ct 2 Ω, R_b 5 Ω, 10 kA, T_p 50 ms, 60 Hz.

use ct_sim::{
    CoreClass, MagnetizationCurve, ParameterSet, SaturationCause, SaturationVerdict, SimOptions,
    SimulationResult, run,
};

fn scenario() -> ParameterSet {
    ParameterSet {
        turns_ratio: 3000.0,
        r_ct_ohm: 2.0,
        r_burden_ohm: 5.0,
        i_fault_primary_a: 10_000.0,
        t_primary_s: 0.05,
        frequency_hz: 60.0,
        v_sat_v: Some(400.0),
        core: CoreClass::Standard,
        curve: MagnetizationCurve {
            s: 5.0,
            a: 1e-6,
            gap_admittance: 0.0,
        },
        ..ParameterSet::default()
    }
}

fn voltage_only() -> SimOptions {
    SimOptions {
        deviation_threshold: None,
        ..SimOptions::default()
    }
}

fn run_ok(params: &ParameterSet, options: &SimOptions) -> SimulationResult {
    run(params, options).expect("scenario should complete")
}

#[test]
fn grid_and_initial_condition() {
    let result = run_ok(&scenario(), &SimOptions::default());

    assert_eq!(result.states.len(), 600);
    assert!((result.dt_s - 1.0 / 12_000.0).abs() < 1e-15);
    assert_eq!(result.v_sat_v, 400.0);
    assert!(result.warnings.is_empty());

    let first = result.states[0];
    assert_eq!(first.t_s, 0.0);
    assert_eq!(first.i_ideal_a, 0.0);
    assert_eq!(first.flux_wb_turns, 0.0);
    assert_eq!(first.i_exc_a, 0.0);
}

#[test]
fn dc_offset_drives_peak_above_symmetrical_within_first_cycle() {
    let params = scenario();
    let result = run_ok(&params, &voltage_only());

    let symmetrical_peak = params.ideal_secondary_peak_a();
    let first_cycle_peak = result.states[..200]
        .iter()
        .map(|s| s.i_ideal_a)
        .fold(f64::MIN, f64::max);
    assert!(first_cycle_peak > 1.5 * symmetrical_peak);
    assert!(first_cycle_peak < 2.0 * symmetrical_peak);
}

#[test]
fn voltage_margin_holds_at_400_volts() {
    let result = run_ok(&scenario(), &voltage_only());

    assert_eq!(result.verdict, SaturationVerdict::NotSaturated);
    let peak = result.peak_required_voltage();
    assert!(peak > 10.0 && peak < 400.0, "peak V_req = {peak}");

    let required = result.required_voltages().expect("full cycles available");
    assert!(!required.saturates_perm);
    assert!(!required.saturates_trans);
    assert!(required.v_req_trans_v >= required.v_req_perm_v);
}

#[test]
fn lower_saturation_voltage_trips_voltage_trigger() {
    let params = ParameterSet {
        v_sat_v: Some(20.0),
        ..scenario()
    };
    let result = run_ok(&params, &voltage_only());

    match result.verdict {
        SaturationVerdict::SaturatedAt { step, time_s, cause } => {
            assert_eq!(cause, SaturationCause::VoltageExceeded);
            let state = result.states[step];
            assert_eq!(state.t_s, time_s);
            assert!(state.v_req_v > 20.0);
            assert!(result.states[..step].iter().all(|s| s.v_req_v <= 20.0));
        }
        SaturationVerdict::NotSaturated => panic!("expected saturation"),
    }
}

#[test]
fn excitation_distortion_trips_deviation_trigger_in_first_cycle() {
    let result = run_ok(&scenario(), &SimOptions::default());

    let SaturationVerdict::SaturatedAt { step, cause, .. } = result.verdict else {
        panic!("expected the deviation check to trip");
    };
    assert_eq!(cause, SaturationCause::CurrentDeviationExceeded);
    assert!(step > 0 && step < 200, "onset step {step}");

    let onset = result.states[step];
    assert!((onset.i_ideal_a - onset.i_real_a).abs() > 0.05 * onset.i_ideal_a.abs());
    // Running past onset keeps the full series.
    assert_eq!(result.states.len(), 600);
}

#[test]
fn stop_on_saturation_truncates_after_onset() {
    let options = SimOptions {
        stop_on_saturation: true,
        ..SimOptions::default()
    };
    let result = run_ok(&scenario(), &options);

    let SaturationVerdict::SaturatedAt { step, .. } = result.verdict else {
        panic!("expected saturation");
    };
    assert!(result.stopped_early);
    assert_eq!(result.states.len(), step + 1);
}

#[test]
fn rms_is_provisional_for_exactly_one_cycle() {
    let result = run_ok(&scenario(), &SimOptions::default());

    assert!(result.states[..199].iter().all(|s| s.rms_provisional));
    assert!(result.states[199..].iter().all(|s| !s.rms_provisional));
}

#[test]
fn saturated_core_sheds_secondary_current() {
    let result = run_ok(&scenario(), &SimOptions::default());

    // Deep in saturation nearly all of the DC-offset current magnetizes the core.
    let last_cycle = &result.states[400..];
    let ideal_rms = (last_cycle.iter().map(|s| s.i_ideal_a.powi(2)).sum::<f64>()
        / last_cycle.len() as f64)
        .sqrt();
    let real_rms = result.states[599].rms_a;
    assert!(real_rms < ideal_rms);
}

#[test]
fn gapped_core_adds_linear_branch() {
    let params = ParameterSet {
        core: CoreClass::Tpz,
        curve: MagnetizationCurve {
            s: 5.0,
            a: 0.0,
            gap_admittance: 0.002,
        },
        ..scenario()
    };
    let result = run_ok(&params, &SimOptions::default());

    for state in &result.states {
        assert_eq!(state.i_exc_a, 0.002 * state.flux_wb_turns);
    }
}
