//! Fixed time grid: a whole number of samples per fundamental cycle.

use ct_core::{Frequency, Time, s};
use uom::si::frequency::hertz;
use uom::si::time::second;

use crate::error::{SimError, SimResult};

/// Upper bound on `samples_per_cycle · cycles`; every sample is stored.
pub const MAX_GRID_SAMPLES: usize = 10_000_000;

/// Uniform sample grid `t_k = k·Δt`, `k ∈ [0, samples_per_cycle·cycles)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    dt: Time,
    samples_per_cycle: usize,
    cycles: usize,
}

impl TimeGrid {
    /// Build the grid; Δt = 1 / (f · samples_per_cycle).
    pub fn new(frequency: Frequency, samples_per_cycle: usize, cycles: usize) -> SimResult<Self> {
        let f_hz = frequency.get::<hertz>();
        if !f_hz.is_finite() || f_hz <= 0.0 {
            return Err(SimError::InvalidParameter {
                what: "frequency must be positive",
            });
        }
        if samples_per_cycle == 0 {
            return Err(SimError::InvalidParameter {
                what: "samples_per_cycle must be positive",
            });
        }
        if cycles == 0 {
            return Err(SimError::InvalidParameter {
                what: "cycles must be positive",
            });
        }
        match samples_per_cycle.checked_mul(cycles) {
            Some(len) if len <= MAX_GRID_SAMPLES => {}
            _ => {
                return Err(SimError::InvalidParameter {
                    what: "samples_per_cycle * cycles exceeds the grid limit",
                });
            }
        }
        Ok(Self {
            dt: s(1.0 / (f_hz * samples_per_cycle as f64)),
            samples_per_cycle,
            cycles,
        })
    }

    pub fn dt(&self) -> Time {
        self.dt
    }

    pub fn dt_s(&self) -> f64 {
        self.dt.get::<second>()
    }

    pub fn samples_per_cycle(&self) -> usize {
        self.samples_per_cycle
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Number of samples on the grid.
    pub fn len(&self) -> usize {
        self.samples_per_cycle * self.cycles
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Simulated interval, `cycles / f`.
    pub fn duration(&self) -> Time {
        self.dt * self.len() as f64
    }

    /// Sample time of step `k`, computed directly so no rounding accumulates.
    pub fn time_at(&self, k: usize) -> f64 {
        k as f64 * self.dt_s()
    }
}
