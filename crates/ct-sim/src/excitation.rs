//! Core excitation models: flux → excitation current.
//!
//! The integrator only needs two things from a core: the excitation current
//! drawn at a given flux, and the incremental slope `di_e/dλ` that forms the
//! denominator of the flux update. Saturation voltage derivation lives here
//! too since it depends on the core class.

use ct_core::signed_pow;

use crate::params::{CoreClass, MagnetizationCurve, ParameterSet};

/// Capability interface shared by every core variant.
pub trait ExcitationModel {
    /// Excitation current i_e(λ), odd in λ and zero at λ = 0.
    fn excitation_current(&self, flux: f64) -> f64;

    /// Incremental slope di_e/dλ, evaluated on |λ|.
    fn slope(&self, flux: f64) -> f64;

    /// Saturation voltage from the IEC formula for this core.
    fn derived_saturation_voltage(&self, params: &ParameterSet) -> f64;

    /// Denominator of the explicit flux increment: `1 + di_e/dλ`.
    fn incremental_denominator(&self, flux: f64) -> f64 {
        1.0 + self.slope(flux)
    }

    /// Supplied V_sat when present, derived otherwise.
    fn saturation_voltage(&self, params: &ParameterSet) -> f64 {
        params
            .v_sat_v
            .unwrap_or_else(|| self.derived_saturation_voltage(params))
    }
}

/// Excitation model for one of the closed set of IEC core classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreModel {
    class: CoreClass,
    curve: MagnetizationCurve,
}

impl CoreModel {
    pub fn new(class: CoreClass, curve: MagnetizationCurve) -> Self {
        Self { class, curve }
    }

    pub fn for_params(params: &ParameterSet) -> Self {
        Self::new(params.core, params.curve)
    }

    pub fn class(&self) -> CoreClass {
        self.class
    }

    fn gap_admittance(&self) -> f64 {
        if self.class.is_gapped() {
            self.curve.gap_admittance
        } else {
            0.0
        }
    }
}

impl ExcitationModel for CoreModel {
    fn excitation_current(&self, flux: f64) -> f64 {
        let iron = self.curve.a * signed_pow(flux, self.curve.s);
        match self.class {
            CoreClass::Standard | CoreClass::Tpx => iron,
            CoreClass::Tpy | CoreClass::Tpz => self.gap_admittance() * flux + iron,
        }
    }

    fn slope(&self, flux: f64) -> f64 {
        let MagnetizationCurve { s, a, .. } = self.curve;
        // powf(0.0) is 1.0 for every base, which is the right limit for S = 1.
        let iron = s * a * flux.abs().powf(s - 1.0);
        match self.class {
            CoreClass::Standard | CoreClass::Tpx => iron,
            CoreClass::Tpy | CoreClass::Tpz => self.gap_admittance() + iron,
        }
    }

    fn derived_saturation_voltage(&self, params: &ParameterSet) -> f64 {
        let remanence_factor = 1.0 / (1.0 - self.class.remanence_limit());
        remanence_factor
            * params.factors.product()
            * (params.r_ct_ohm + params.r_burden_ohm)
            * params.i_rated_secondary_a
    }
}
