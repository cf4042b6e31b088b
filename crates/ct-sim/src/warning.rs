//! Non-fatal configuration diagnostics attached to a run result.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::grid::TimeGrid;
use crate::params::{CoreClass, ParameterSet};

pub const RECOMMENDED_SAMPLES_PER_CYCLE: RangeInclusive<usize> = 100..=2000;
pub const RECOMMENDED_DEVIATION_THRESHOLD: RangeInclusive<f64> = 0.01..=0.20;
/// Above this `N·R_ct·Δt` the explicit-lag update can overshoot and diverge.
pub const STIFFNESS_LIMIT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfigurationWarning {
    SamplesPerCycleOutOfRange { value: usize },
    DeviationThresholdOutOfRange { value: f64 },
    ExplicitStepStiff { stiffness: f64 },
    GapAdmittanceIgnored { core: CoreClass, gap_admittance: f64 },
}

impl fmt::Display for ConfigurationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationWarning::SamplesPerCycleOutOfRange { value } => write!(
                f,
                "samples_per_cycle = {value} outside recommended {}..={}",
                RECOMMENDED_SAMPLES_PER_CYCLE.start(),
                RECOMMENDED_SAMPLES_PER_CYCLE.end()
            ),
            ConfigurationWarning::DeviationThresholdOutOfRange { value } => write!(
                f,
                "deviation_threshold = {value} outside recommended {}..={}",
                RECOMMENDED_DEVIATION_THRESHOLD.start(),
                RECOMMENDED_DEVIATION_THRESHOLD.end()
            ),
            ConfigurationWarning::ExplicitStepStiff { stiffness } => write!(
                f,
                "N*R_ct*dt = {stiffness:.3} exceeds {STIFFNESS_LIMIT}; explicit step may diverge after saturation"
            ),
            ConfigurationWarning::GapAdmittanceIgnored {
                core,
                gap_admittance,
            } => write!(
                f,
                "gap_admittance = {gap_admittance} ignored for ungapped {core} core"
            ),
        }
    }
}

/// Collect every warning that applies to this configuration, in a fixed order.
pub fn check_configuration(
    params: &ParameterSet,
    grid: &TimeGrid,
    deviation_threshold: Option<f64>,
) -> Vec<ConfigurationWarning> {
    let mut warnings = Vec::new();

    let spc = grid.samples_per_cycle();
    if !RECOMMENDED_SAMPLES_PER_CYCLE.contains(&spc) {
        warnings.push(ConfigurationWarning::SamplesPerCycleOutOfRange { value: spc });
    }

    if let Some(threshold) = deviation_threshold
        && !RECOMMENDED_DEVIATION_THRESHOLD.contains(&threshold)
    {
        warnings.push(ConfigurationWarning::DeviationThresholdOutOfRange { value: threshold });
    }

    let stiffness = params.turns_ratio * params.r_ct_ohm * grid.dt_s();
    if stiffness > STIFFNESS_LIMIT {
        warnings.push(ConfigurationWarning::ExplicitStepStiff { stiffness });
    }

    if !params.core.is_gapped() && params.curve.gap_admittance > 0.0 {
        warnings.push(ConfigurationWarning::GapAdmittanceIgnored {
            core: params.core,
            gap_admittance: params.curve.gap_admittance,
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MagnetizationCurve;
    use ct_core::hz;

    #[test]
    fn defaults_are_quiet() {
        let params = ParameterSet::default();
        let grid = TimeGrid::new(hz(60.0), 200, 3).unwrap();
        assert!(check_configuration(&params, &grid, Some(0.05)).is_empty());
        assert!(check_configuration(&params, &grid, None).is_empty());
    }

    #[test]
    fn coarse_grid_and_loose_threshold() {
        let params = ParameterSet::default();
        let grid = TimeGrid::new(hz(60.0), 20, 3).unwrap();
        let warnings = check_configuration(&params, &grid, Some(0.5));
        assert_eq!(
            warnings,
            vec![
                ConfigurationWarning::SamplesPerCycleOutOfRange { value: 20 },
                ConfigurationWarning::DeviationThresholdOutOfRange { value: 0.5 },
            ]
        );
    }

    #[test]
    fn stiff_explicit_step_is_flagged() {
        let params = ParameterSet {
            turns_ratio: 3000.0,
            r_ct_ohm: 200.0,
            ..ParameterSet::default()
        };
        let grid = TimeGrid::new(hz(60.0), 200, 3).unwrap();
        let warnings = check_configuration(&params, &grid, Some(0.05));
        assert!(matches!(
            warnings.as_slice(),
            [ConfigurationWarning::ExplicitStepStiff { stiffness }] if (*stiffness - 50.0).abs() < 1e-9
        ));
        assert!(warnings[0].to_string().contains("may diverge"));
    }

    #[test]
    fn gap_on_closed_core_is_flagged() {
        let params = ParameterSet {
            curve: MagnetizationCurve {
                gap_admittance: 0.1,
                ..MagnetizationCurve::default()
            },
            ..ParameterSet::default()
        };
        let grid = TimeGrid::new(hz(60.0), 200, 3).unwrap();
        let warnings = check_configuration(&params, &grid, Some(0.05));
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].to_string(),
            "gap_admittance = 0.1 ignored for ungapped STANDARD core"
        );
    }
}
