//! Explicit-lag flux integrator.
//!
//! Per step k ≥ 1:
//!
//! ```text
//!   i_ideal(t) = (√2·I_p/N)·(e^(−t/T_p) − cos ωt)
//!   Δλ         = N·R_ct·(i_ideal(t) − i_e(t−Δt)) / (1 + di_e/dλ|λ(t−Δt)) · Δt
//!   λ(t)       = λ(t−Δt) + Δλ
//!   i_e(t)     = i_e(λ(t))
//!   i_s(t)     = i_ideal(t) − i_e(t)
//! ```
//!
//! The excitation current enters with a one-step lag; there is no
//! re-solve inside a step. The scheme is conditionally stable: the
//! linearized error amplification is bounded by `N·R_ct·Δt`, so large
//! turns ratios or winding resistances at a coarse grid can diverge once
//! the core saturates. Δt is never adapted here.

use ct_core::constants::angular_frequency;

use crate::excitation::ExcitationModel;
use crate::grid::TimeGrid;
use crate::params::ParameterSet;

/// Raw integrator output for one grid sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxStep {
    pub step: usize,
    pub t_s: f64,
    pub flux: f64,
    pub i_ideal: f64,
    pub i_exc: f64,
    pub i_real: f64,
}

/// Fully offset fault current referred to the secondary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdealSecondaryCurrent {
    peak_a: f64,
    t_primary_s: f64,
    omega: f64,
}

impl IdealSecondaryCurrent {
    pub fn for_params(params: &ParameterSet) -> Self {
        Self {
            peak_a: params.ideal_secondary_peak_a(),
            t_primary_s: params.t_primary_s,
            omega: angular_frequency(params.frequency_hz),
        }
    }

    pub fn at(&self, t_s: f64) -> f64 {
        self.peak_a * ((-t_s / self.t_primary_s).exp() - (self.omega * t_s).cos())
    }
}

/// Steps (λ, i_ideal, i_e, i_s) across a [`TimeGrid`].
///
/// Yields the initial condition as step 0, then one [`FluxStep`] per
/// grid sample until the grid is exhausted.
#[derive(Debug, Clone)]
pub struct FluxIntegrator<M> {
    model: M,
    source: IdealSecondaryCurrent,
    drive_gain: f64,
    grid: TimeGrid,
    next: usize,
    flux: f64,
    i_exc: f64,
}

impl<M: ExcitationModel> FluxIntegrator<M> {
    pub fn new(model: M, params: &ParameterSet, grid: TimeGrid) -> Self {
        Self {
            model,
            source: IdealSecondaryCurrent::for_params(params),
            drive_gain: params.turns_ratio * params.r_ct_ohm,
            grid,
            next: 0,
            flux: 0.0,
            i_exc: 0.0,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Flux increment for one step given the ideal current at the new time.
    ///
    /// Uses λ and i_e from the previous step only.
    pub fn flux_increment(&self, i_ideal: f64) -> f64 {
        let dt = self.grid.dt_s();
        self.drive_gain * (i_ideal - self.i_exc) / self.model.incremental_denominator(self.flux)
            * dt
    }

    fn advance(&mut self) -> Option<FluxStep> {
        let k = self.next;
        if k >= self.grid.len() {
            return None;
        }
        let t_s = self.grid.time_at(k);
        let i_ideal = self.source.at(t_s);

        if k > 0 {
            self.flux += self.flux_increment(i_ideal);
            self.i_exc = self.model.excitation_current(self.flux);
        }
        self.next += 1;

        Some(FluxStep {
            step: k,
            t_s,
            flux: self.flux,
            i_ideal,
            i_exc: self.i_exc,
            i_real: i_ideal - self.i_exc,
        })
    }
}

impl<M: ExcitationModel> Iterator for FluxIntegrator<M> {
    type Item = FluxStep;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<M: ExcitationModel> ExactSizeIterator for FluxIntegrator<M> {}
