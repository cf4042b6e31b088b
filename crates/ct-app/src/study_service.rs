//! Study loading, validation, and introspection.

use std::path::Path;

use ct_sim::CoreClass;
use ct_study::{CaseDef, Study};

use crate::error::{AppError, AppResult};

/// Summary of a case for listing.
#[derive(Debug, Clone)]
pub struct CaseSummary {
    pub id: String,
    pub name: String,
    pub core: CoreClass,
    pub frequency_hz: f64,
    pub i_fault_primary_a: f64,
    pub v_sat_v: f64,
    pub v_sat_derived: bool,
}

/// Load a study from YAML or JSON, migrated to the latest schema.
pub fn load_study(path: &Path) -> AppResult<Study> {
    let study = ct_study::load(path)?;
    Ok(study)
}

pub fn validate_study(study: &Study) -> AppResult<()> {
    ct_study::validate_study(study)?;
    Ok(())
}

/// List all cases with their effective saturation voltage.
pub fn list_cases(study: &Study) -> Vec<CaseSummary> {
    study
        .cases
        .iter()
        .map(|case| {
            let p = &case.params;
            CaseSummary {
                id: case.id.clone(),
                name: case.name.clone(),
                core: p.core,
                frequency_hz: p.frequency_hz,
                i_fault_primary_a: p.i_fault_primary_a,
                v_sat_v: effective_v_sat(case),
                v_sat_derived: p.v_sat_v.is_none(),
            }
        })
        .collect()
}

pub fn get_case<'a>(study: &'a Study, case_id: &str) -> AppResult<&'a CaseDef> {
    study
        .case(case_id)
        .ok_or_else(|| AppError::CaseNotFound(case_id.to_string()))
}

fn effective_v_sat(case: &CaseDef) -> f64 {
    use ct_sim::ExcitationModel;

    let model = ct_sim::CoreModel::for_params(&case.params);
    model.saturation_voltage(&case.params)
}
