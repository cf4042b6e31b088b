//! Steady-state and transient required-voltage checks.

use serde::{Deserialize, Serialize};

use crate::state::SimulationState;

/// Required secondary voltages from the one-cycle RMS trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequiredVoltages {
    /// From the last full cycle (steady-state approximation).
    pub v_req_perm_v: f64,
    /// From the worst full cycle.
    pub v_req_trans_v: f64,
    pub saturates_perm: bool,
    pub saturates_trans: bool,
}

impl RequiredVoltages {
    /// Returns `None` when no RMS window ever filled.
    pub fn from_states(
        states: &[SimulationState],
        loop_resistance_ohm: f64,
        v_sat_v: f64,
    ) -> Option<Self> {
        let mut full = states.iter().filter(|s| !s.rms_provisional).map(|s| s.rms_a);
        let first = full.next()?;
        let (last, worst) = full.fold((first, first), |(_, worst), rms| (rms, worst.max(rms)));

        let v_req_perm_v = loop_resistance_ohm * last;
        let v_req_trans_v = loop_resistance_ohm * worst;
        Some(Self {
            v_req_perm_v,
            v_req_trans_v,
            saturates_perm: v_sat_v < v_req_perm_v,
            saturates_trans: v_sat_v < v_req_trans_v,
        })
    }
}
