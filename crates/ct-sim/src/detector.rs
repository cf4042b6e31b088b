//! Saturation onset detection.
//!
//! Two independent triggers, either one sufficient:
//! - required secondary voltage |i_s|·(R_ct + R_b) above V_sat
//! - |i_s,ideal − i_s| above a fraction of |i_s,ideal|
//!
//! The first trigger latches; later samples are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::SimulationState;

/// Which check tripped the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaturationCause {
    VoltageExceeded,
    CurrentDeviationExceeded,
}

impl fmt::Display for SaturationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaturationCause::VoltageExceeded => f.write_str("voltage-exceeded"),
            SaturationCause::CurrentDeviationExceeded => f.write_str("current-deviation-exceeded"),
        }
    }
}

/// Outcome of a run with respect to core saturation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SaturationVerdict {
    NotSaturated,
    SaturatedAt {
        step: usize,
        time_s: f64,
        cause: SaturationCause,
    },
}

impl SaturationVerdict {
    pub fn is_saturated(&self) -> bool {
        matches!(self, SaturationVerdict::SaturatedAt { .. })
    }
}

impl fmt::Display for SaturationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaturationVerdict::NotSaturated => f.write_str("not saturated"),
            SaturationVerdict::SaturatedAt {
                step,
                time_s,
                cause,
            } => write!(
                f,
                "saturated at step {step} (t = {:.3} ms, {cause})",
                time_s * 1e3
            ),
        }
    }
}

/// Thresholds the detector compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub v_sat_v: f64,
    pub loop_resistance_ohm: f64,
    /// Allowed |i_s,ideal − i_s| as a fraction of |i_s,ideal|; `None` disables the check.
    pub deviation_threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DetectorState {
    Watching,
    Saturated {
        step: usize,
        time_s: f64,
        cause: SaturationCause,
    },
}

/// Watches the state stream and latches the first saturation sample.
#[derive(Debug, Clone)]
pub struct SaturationDetector {
    config: DetectorConfig,
    state: DetectorState,
}

impl SaturationDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            state: DetectorState::Watching,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn is_saturated(&self) -> bool {
        matches!(self.state, DetectorState::Saturated { .. })
    }

    /// Feed one sample. Returns the cause only on the step that trips the detector.
    pub fn observe(&mut self, sample: &SimulationState) -> Option<SaturationCause> {
        if self.is_saturated() {
            return None;
        }
        let cause = self.classify(sample)?;
        self.state = DetectorState::Saturated {
            step: sample.step,
            time_s: sample.t_s,
            cause,
        };
        Some(cause)
    }

    pub fn verdict(&self) -> SaturationVerdict {
        match self.state {
            DetectorState::Watching => SaturationVerdict::NotSaturated,
            DetectorState::Saturated {
                step,
                time_s,
                cause,
            } => SaturationVerdict::SaturatedAt {
                step,
                time_s,
                cause,
            },
        }
    }

    fn classify(&self, sample: &SimulationState) -> Option<SaturationCause> {
        let v_req = sample.i_real_a.abs() * self.config.loop_resistance_ohm;
        if v_req > self.config.v_sat_v {
            return Some(SaturationCause::VoltageExceeded);
        }

        let threshold = self.config.deviation_threshold?;
        let deviation = (sample.i_ideal_a - sample.i_real_a).abs();
        (deviation > threshold * sample.i_ideal_a.abs())
            .then_some(SaturationCause::CurrentDeviationExceeded)
    }
}
