//! Per-step simulation record.

use serde::{Deserialize, Serialize};

/// Snapshot of the CT after one grid step.
///
/// Units: seconds, weber-turns, amperes, volts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub step: usize,
    pub t_s: f64,
    pub flux_wb_turns: f64,
    /// Ideal (perfectly transformed) secondary current i_s,ideal.
    pub i_ideal_a: f64,
    /// Excitation current i_e consumed by the core.
    pub i_exc_a: f64,
    /// Real secondary current i_s = i_s,ideal − i_e.
    pub i_real_a: f64,
    /// One-cycle RMS of i_s ending at this step.
    pub rms_a: f64,
    pub rms_provisional: bool,
    /// Instantaneous required voltage |i_s|·(R_ct + R_b).
    pub v_req_v: f64,
}
