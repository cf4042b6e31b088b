//! Result data types.

use ct_sim::{ConfigurationWarning, RequiredVoltages, SaturationVerdict, SimulationState};
use serde::{Deserialize, Serialize};

pub type RunId = String;

/// Stored rows are the engine's own state records, field for field.
pub type TimeseriesRecord = SimulationState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub case_id: String,
    pub timestamp: String,
    pub solver_version: String,
    pub run_info: RunInfo,
    pub verdict: SaturationVerdict,
    pub v_sat_v: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<RequiredVoltages>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ConfigurationWarning>,
    #[serde(default)]
    pub stopped_early: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunInfo {
    pub dt_s: f64,
    pub samples_per_cycle: usize,
    pub cycles: usize,
    pub steps: usize,
}
