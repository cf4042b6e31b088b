//! Immutable description of one CT and its fault scenario.

use std::fmt;
use std::str::FromStr;

use ct_core::{Frequency, Resistance, ensure_finite, ensure_non_negative, ensure_positive, hz, ohms};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// IEC core characteristic selecting the excitation model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoreClass {
    /// Closed iron core, generic protection class.
    #[default]
    Standard,
    /// Closed core, no remanence limit.
    Tpx,
    /// Gapped core, remanence limited to 10 %.
    Tpy,
    /// Linearized (strongly gapped) core, negligible remanence.
    Tpz,
}

impl CoreClass {
    pub const ALL: [CoreClass; 4] = [
        CoreClass::Standard,
        CoreClass::Tpx,
        CoreClass::Tpy,
        CoreClass::Tpz,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CoreClass::Standard => "STANDARD",
            CoreClass::Tpx => "TPX",
            CoreClass::Tpy => "TPY",
            CoreClass::Tpz => "TPZ",
        }
    }

    /// Whether the magnetic path contains an air gap.
    pub fn is_gapped(self) -> bool {
        matches!(self, CoreClass::Tpy | CoreClass::Tpz)
    }

    /// Largest remanent flux allowed by the class, as a fraction of saturation flux.
    pub fn remanence_limit(self) -> f64 {
        match self {
            CoreClass::Tpy => 0.10,
            CoreClass::Standard | CoreClass::Tpx | CoreClass::Tpz => 0.0,
        }
    }
}

impl fmt::Display for CoreClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CoreClass {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoreClass::ALL
            .into_iter()
            .find(|class| class.label().eq_ignore_ascii_case(s.trim()))
            .ok_or(SimError::InvalidParameter {
                what: "unsupported core class",
            })
    }
}

/// IEC correction factors used when V_sat is derived rather than supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationFactors {
    #[serde(default = "unity")]
    pub k_h: f64,
    #[serde(default = "unity")]
    pub k_ssc: f64,
    #[serde(default = "unity")]
    pub k_td: f64,
}

impl Default for SaturationFactors {
    fn default() -> Self {
        Self {
            k_h: 1.0,
            k_ssc: 1.0,
            k_td: 1.0,
        }
    }
}

impl SaturationFactors {
    pub fn product(&self) -> f64 {
        self.k_h * self.k_ssc * self.k_td
    }
}

/// Magnetization curve constants: `i_e ≈ A·|λ|^S·sign(λ)` (+ `G·λ` for gapped cores).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetizationCurve {
    /// Slope exponent S.
    #[serde(default = "default_slope")]
    pub s: f64,
    /// Scale constant A.
    #[serde(default = "unity")]
    pub a: f64,
    /// Linear air-gap branch G (A per Wb-turn); honored by gapped classes only.
    #[serde(default)]
    pub gap_admittance: f64,
}

impl Default for MagnetizationCurve {
    fn default() -> Self {
        Self {
            s: default_slope(),
            a: 1.0,
            gap_admittance: 0.0,
        }
    }
}

fn unity() -> f64 {
    1.0
}

fn default_slope() -> f64 {
    2.0
}

fn default_rated_secondary() -> f64 {
    1.0
}

/// Electrical/physical constants of one CT plus the fault scenario.
///
/// Built once per run and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Primary:secondary current ratio (e.g. 3000 for 3000/1 A).
    pub turns_ratio: f64,
    /// Secondary winding resistance R_ct.
    pub r_ct_ohm: f64,
    /// Burden resistance R_b.
    pub r_burden_ohm: f64,
    /// Primary fault current, RMS.
    pub i_fault_primary_a: f64,
    /// Primary (DC offset) time constant T_p.
    pub t_primary_s: f64,
    pub frequency_hz: f64,
    /// Rated secondary current I_sn (typically 1 or 5 A).
    #[serde(default = "default_rated_secondary")]
    pub i_rated_secondary_a: f64,
    #[serde(default)]
    pub factors: SaturationFactors,
    /// Supplied saturation voltage; derived from the IEC formula when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_sat_v: Option<f64>,
    #[serde(default)]
    pub core: CoreClass,
    #[serde(default)]
    pub curve: MagnetizationCurve,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            turns_ratio: 3000.0,
            r_ct_ohm: 0.5,
            r_burden_ohm: 1.0,
            i_fault_primary_a: 10_000.0,
            t_primary_s: 0.05,
            frequency_hz: 60.0,
            i_rated_secondary_a: 1.0,
            factors: SaturationFactors::default(),
            v_sat_v: None,
            core: CoreClass::default(),
            curve: MagnetizationCurve::default(),
        }
    }
}

impl ParameterSet {
    /// Check every invariant; nothing is simulated from an unvalidated set.
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.turns_ratio, "turns_ratio must be positive")?;
        ensure_positive(self.frequency_hz, "frequency_hz must be positive")?;
        ensure_positive(self.t_primary_s, "t_primary_s must be positive")?;
        ensure_positive(self.i_fault_primary_a, "i_fault_primary_a must be positive")?;
        ensure_non_negative(self.r_ct_ohm, "r_ct_ohm must be non-negative")?;
        ensure_non_negative(self.r_burden_ohm, "r_burden_ohm must be non-negative")?;
        ensure_positive(
            self.i_rated_secondary_a,
            "i_rated_secondary_a must be positive",
        )?;

        ensure_positive(self.factors.k_h, "k_h must be positive")?;
        ensure_positive(self.factors.k_ssc, "k_ssc must be positive")?;
        ensure_positive(self.factors.k_td, "k_td must be positive")?;

        if let Some(v_sat) = self.v_sat_v {
            ensure_positive(v_sat, "v_sat_v must be positive when supplied")?;
        }

        let s = ensure_finite(self.curve.s, "curve.s must be finite")?;
        if s < 1.0 {
            return Err(SimError::InvalidParameter {
                what: "curve.s must be at least 1",
            });
        }
        ensure_non_negative(self.curve.a, "curve.a must be non-negative")?;
        ensure_non_negative(
            self.curve.gap_admittance,
            "curve.gap_admittance must be non-negative",
        )?;
        Ok(())
    }

    pub fn frequency(&self) -> Frequency {
        hz(self.frequency_hz)
    }

    /// Total secondary loop resistance R_ct + R_b.
    pub fn loop_resistance(&self) -> Resistance {
        ohms(self.r_ct_ohm + self.r_burden_ohm)
    }

    /// Peak of the symmetrical ideal secondary current, √2·I_p / N.
    pub fn ideal_secondary_peak_a(&self) -> f64 {
        std::f64::consts::SQRT_2 * self.i_fault_primary_a / self.turns_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_is_valid() {
        ParameterSet::default().validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_ratio_frequency_and_time_constant() {
        let mutations: [fn(&mut ParameterSet); 5] = [
            |p| p.turns_ratio = 0.0,
            |p| p.frequency_hz = 0.0,
            |p| p.t_primary_s = -0.05,
            |p| p.v_sat_v = Some(0.0),
            |p| p.i_fault_primary_a = f64::NAN,
        ];
        for mutate in mutations {
            let mut params = ParameterSet::default();
            mutate(&mut params);
            assert!(matches!(
                params.validate(),
                Err(SimError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn rejects_sub_unity_slope_exponent() {
        let params = ParameterSet {
            curve: MagnetizationCurve {
                s: 0.5,
                ..MagnetizationCurve::default()
            },
            ..ParameterSet::default()
        };
        assert_eq!(
            params.validate(),
            Err(SimError::InvalidParameter {
                what: "curve.s must be at least 1"
            })
        );
    }

    #[test]
    fn zero_resistances_are_allowed() {
        let params = ParameterSet {
            r_ct_ohm: 0.0,
            r_burden_ohm: 0.0,
            ..ParameterSet::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn core_class_parses_case_insensitively() {
        assert_eq!("tpy".parse::<CoreClass>().unwrap(), CoreClass::Tpy);
        assert_eq!(" Standard ".parse::<CoreClass>().unwrap(), CoreClass::Standard);
        assert!("TPW".parse::<CoreClass>().is_err());
    }

    #[test]
    fn ideal_peak_matches_turns_ratio() {
        let params = ParameterSet::default();
        let expected = 2f64.sqrt() * 10_000.0 / 3000.0;
        assert!((params.ideal_secondary_peak_a() - expected).abs() < 1e-12);
    }
}
