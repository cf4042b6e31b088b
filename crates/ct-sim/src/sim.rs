//! Simulation runner and result recording.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ct_core::ensure_finite;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uom::si::electrical_resistance::ohm;

use crate::detector::{DetectorConfig, SaturationDetector, SaturationVerdict};
use crate::error::{SimError, SimResult};
use crate::excitation::{CoreModel, ExcitationModel};
use crate::grid::{MAX_GRID_SAMPLES, TimeGrid};
use crate::integrator::{FluxIntegrator, FluxStep};
use crate::params::ParameterSet;
use crate::rms::RmsWindow;
use crate::state::SimulationState;
use crate::summary::RequiredVoltages;
use crate::warning::{ConfigurationWarning, check_configuration};

pub const DEFAULT_SAMPLES_PER_CYCLE: usize = 200;
pub const DEFAULT_CYCLES: usize = 3;
pub const DEFAULT_DEVIATION_THRESHOLD: f64 = 0.05;

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimOptions {
    /// Grid resolution (samples per fundamental cycle)
    #[serde(default = "default_samples_per_cycle")]
    pub samples_per_cycle: usize,
    /// Number of fundamental cycles simulated
    #[serde(default = "default_cycles")]
    pub cycles: usize,
    /// Current-deviation trigger as a fraction of |i_ideal|; `null` disables it
    #[serde(default = "default_deviation_threshold")]
    pub deviation_threshold: Option<f64>,
    /// Explicit time step (seconds); overrides `samples_per_cycle` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_step_s: Option<f64>,
    /// Stop at the first saturated sample instead of running every cycle
    #[serde(default)]
    pub stop_on_saturation: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            samples_per_cycle: DEFAULT_SAMPLES_PER_CYCLE,
            cycles: DEFAULT_CYCLES,
            deviation_threshold: default_deviation_threshold(),
            time_step_s: None,
            stop_on_saturation: false,
        }
    }
}

fn default_samples_per_cycle() -> usize {
    DEFAULT_SAMPLES_PER_CYCLE
}

fn default_cycles() -> usize {
    DEFAULT_CYCLES
}

fn default_deviation_threshold() -> Option<f64> {
    Some(DEFAULT_DEVIATION_THRESHOLD)
}

impl SimOptions {
    /// Samples per cycle after applying an explicit `time_step_s`.
    pub fn resolve_samples_per_cycle(&self, frequency_hz: f64) -> SimResult<usize> {
        let Some(dt) = self.time_step_s else {
            return Ok(self.samples_per_cycle);
        };
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidParameter {
                what: "time_step_s must be positive",
            });
        }
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(SimError::InvalidParameter {
                what: "frequency must be positive",
            });
        }
        let spc = (1.0 / (frequency_hz * dt)).round();
        if !spc.is_finite() || spc > MAX_GRID_SAMPLES as f64 {
            return Err(SimError::InvalidParameter {
                what: "time_step_s too small for the grid limit",
            });
        }
        if spc < 1.0 {
            return Err(SimError::InvalidParameter {
                what: "time_step_s longer than one cycle",
            });
        }
        Ok(spc as usize)
    }

    pub fn validate(&self) -> SimResult<()> {
        if let Some(threshold) = self.deviation_threshold
            && (!threshold.is_finite() || threshold <= 0.0)
        {
            return Err(SimError::InvalidParameter {
                what: "deviation_threshold must be positive",
            });
        }
        if self.time_step_s.is_none() && self.samples_per_cycle == 0 {
            return Err(SimError::InvalidParameter {
                what: "samples_per_cycle must be positive",
            });
        }
        if self.cycles == 0 {
            return Err(SimError::InvalidParameter {
                what: "cycles must be positive",
            });
        }
        if self.cycles > MAX_GRID_SAMPLES {
            return Err(SimError::InvalidParameter {
                what: "cycles exceeds the grid limit",
            });
        }
        if self.time_step_s.is_none()
            && self
                .samples_per_cycle
                .checked_mul(self.cycles)
                .is_none_or(|len| len > MAX_GRID_SAMPLES)
        {
            return Err(SimError::InvalidParameter {
                what: "samples_per_cycle * cycles exceeds the grid limit",
            });
        }
        Ok(())
    }
}

/// Cooperative cancellation handle shared between a run and its owner.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Record of one completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationResult {
    /// One entry per grid step, in time order
    pub states: Vec<SimulationState>,
    pub verdict: SaturationVerdict,
    pub warnings: Vec<ConfigurationWarning>,
    /// Saturation voltage used by the detector (supplied or derived)
    pub v_sat_v: f64,
    pub dt_s: f64,
    pub samples_per_cycle: usize,
    pub cycles: usize,
    pub loop_resistance_ohm: f64,
    /// True when `stop_on_saturation` cut the run short
    pub stopped_early: bool,
}

impl SimulationResult {
    pub fn required_voltages(&self) -> Option<RequiredVoltages> {
        RequiredVoltages::from_states(&self.states, self.loop_resistance_ohm, self.v_sat_v)
    }

    pub fn peak_flux(&self) -> f64 {
        self.states
            .iter()
            .map(|s| s.flux_wb_turns.abs())
            .fold(0.0, f64::max)
    }

    pub fn peak_required_voltage(&self) -> f64 {
        self.states.iter().map(|s| s.v_req_v).fold(0.0, f64::max)
    }
}

/// A validated, ready-to-execute simulation of one CT.
///
/// Holds only immutable inputs; `execute` builds fresh integrator, RMS
/// and detector state on every call, so one prepared run can be executed
/// repeatedly or shared across threads.
#[derive(Clone, Debug)]
pub struct SimulationRun {
    params: ParameterSet,
    options: SimOptions,
    model: CoreModel,
    grid: TimeGrid,
    v_sat_v: f64,
    warnings: Vec<ConfigurationWarning>,
}

impl SimulationRun {
    pub fn prepare(params: ParameterSet, options: SimOptions) -> SimResult<Self> {
        params.validate()?;
        options.validate()?;

        let spc = options.resolve_samples_per_cycle(params.frequency_hz)?;
        let grid = TimeGrid::new(params.frequency(), spc, options.cycles)?;
        let model = CoreModel::for_params(&params);
        let v_sat_v = model.saturation_voltage(&params);
        let warnings = check_configuration(&params, &grid, options.deviation_threshold);

        Ok(Self {
            params,
            options,
            model,
            grid,
            v_sat_v,
            warnings,
        })
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn options(&self) -> &SimOptions {
        &self.options
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn v_sat_v(&self) -> f64 {
        self.v_sat_v
    }

    pub fn warnings(&self) -> &[ConfigurationWarning] {
        &self.warnings
    }

    pub fn execute(&self) -> SimResult<SimulationResult> {
        self.execute_with_cancel(None)
    }

    /// Run over the whole grid, checking `cancel` once per step.
    pub fn execute_with_cancel(&self, cancel: Option<&CancelFlag>) -> SimResult<SimulationResult> {
        let loop_resistance_ohm = self.params.loop_resistance().get::<ohm>();
        debug!(
            dt_s = self.grid.dt_s(),
            steps = self.grid.len(),
            core = %self.params.core,
            v_sat_v = self.v_sat_v,
            "starting flux integration"
        );
        for warning in &self.warnings {
            warn!(%warning, "configuration warning");
        }

        let mut rms = RmsWindow::new(self.grid.samples_per_cycle())?;
        let mut detector = SaturationDetector::new(DetectorConfig {
            v_sat_v: self.v_sat_v,
            loop_resistance_ohm,
            deviation_threshold: self.options.deviation_threshold,
        });
        let mut states = Vec::with_capacity(self.grid.len());
        let mut stopped_early = false;

        for step in FluxIntegrator::new(self.model, &self.params, self.grid) {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                debug!(step = step.step, "simulation cancelled");
                return Err(SimError::Cancelled { step: step.step });
            }
            check_finite(&step)?;

            let reading = rms.update(step.i_real);
            let state = SimulationState {
                step: step.step,
                t_s: step.t_s,
                flux_wb_turns: step.flux,
                i_ideal_a: step.i_ideal,
                i_exc_a: step.i_exc,
                i_real_a: step.i_real,
                rms_a: reading.value,
                rms_provisional: reading.provisional,
                v_req_v: step.i_real.abs() * loop_resistance_ohm,
            };
            states.push(state);

            if let Some(cause) = detector.observe(&state) {
                info!(step = state.step, t_s = state.t_s, %cause, "core saturation detected");
                if self.options.stop_on_saturation {
                    stopped_early = state.step + 1 < self.grid.len();
                    break;
                }
            }
        }

        let result = SimulationResult {
            states,
            verdict: detector.verdict(),
            warnings: self.warnings.clone(),
            v_sat_v: self.v_sat_v,
            dt_s: self.grid.dt_s(),
            samples_per_cycle: self.grid.samples_per_cycle(),
            cycles: self.grid.cycles(),
            loop_resistance_ohm,
            stopped_early,
        };
        debug!(
            steps = result.states.len(),
            verdict = %result.verdict,
            peak_flux = result.peak_flux(),
            "flux integration finished"
        );
        Ok(result)
    }
}

fn check_finite(step: &FluxStep) -> SimResult<()> {
    let diverged = |quantity: &'static str, value: f64| {
        ensure_finite(value, quantity).map_err(|_| SimError::NumericDivergence {
            step: step.step,
            last_valid_step: step.step.saturating_sub(1),
            quantity,
            value,
        })
    };
    diverged("flux", step.flux)?;
    diverged("excitation current", step.i_exc)?;
    diverged("secondary current", step.i_real)?;
    Ok(())
}

/// Validate, then simulate one CT over the configured grid.
pub fn run(params: &ParameterSet, options: &SimOptions) -> SimResult<SimulationResult> {
    SimulationRun::prepare(params.clone(), options.clone())?.execute()
}

/// Like [`run`], but aborts with [`SimError::Cancelled`] once `cancel` is raised.
pub fn run_cancellable(
    params: &ParameterSet,
    options: &SimOptions,
    cancel: &CancelFlag,
) -> SimResult<SimulationResult> {
    SimulationRun::prepare(params.clone(), options.clone())?.execute_with_cancel(Some(cancel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.samples_per_cycle, 200);
        assert_eq!(opts.cycles, 3);
        assert_eq!(opts.deviation_threshold, Some(0.05));
        assert_eq!(opts.time_step_s, None);
        assert!(!opts.stop_on_saturation);
    }

    #[test]
    fn explicit_time_step_sets_grid_resolution() {
        let opts = SimOptions {
            time_step_s: Some(1.0 / 6000.0),
            ..SimOptions::default()
        };
        assert_eq!(opts.resolve_samples_per_cycle(60.0).unwrap(), 100);
        let bad = SimOptions {
            time_step_s: Some(0.0),
            ..SimOptions::default()
        };
        assert!(bad.resolve_samples_per_cycle(60.0).is_err());
        let too_long = SimOptions {
            time_step_s: Some(1.0),
            ..SimOptions::default()
        };
        assert!(too_long.resolve_samples_per_cycle(60.0).is_err());
        let tiny = SimOptions {
            time_step_s: Some(1e-300),
            ..SimOptions::default()
        };
        assert!(matches!(
            tiny.resolve_samples_per_cycle(60.0),
            Err(SimError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn sim_options_invalid() {
        let zero_spc = SimOptions {
            samples_per_cycle: 0,
            ..SimOptions::default()
        };
        assert!(matches!(
            run(&ParameterSet::default(), &zero_spc),
            Err(SimError::InvalidParameter { .. })
        ));

        let negative_threshold = SimOptions {
            deviation_threshold: Some(-0.1),
            ..SimOptions::default()
        };
        assert!(negative_threshold.validate().is_err());
    }

    #[test]
    fn prepared_run_reports_grid_and_vsat() {
        let params = ParameterSet {
            v_sat_v: Some(250.0),
            ..ParameterSet::default()
        };
        let prepared = SimulationRun::prepare(params, SimOptions::default()).unwrap();
        assert_eq!(prepared.grid().len(), 600);
        assert_eq!(prepared.v_sat_v(), 250.0);
        assert!(prepared.warnings().is_empty());
    }

    #[test]
    fn pre_cancelled_run_stops_at_first_step() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = run_cancellable(&ParameterSet::default(), &SimOptions::default(), &cancel)
            .unwrap_err();
        assert_eq!(err, SimError::Cancelled { step: 0 });
    }

    #[test]
    fn result_records_every_step() {
        let result = run(&ParameterSet::default(), &SimOptions::default()).unwrap();
        assert_eq!(result.states.len(), 600);
        assert_eq!(result.samples_per_cycle, 200);
        assert_eq!(result.cycles, 3);
        assert!(!result.stopped_early);
        assert!(result.required_voltages().is_some());
    }
}
