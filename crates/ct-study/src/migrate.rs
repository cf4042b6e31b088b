//! Schema migration framework.

use crate::StudyError;
use crate::schema::Study;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut study: Study) -> Result<Study, StudyError> {
    while study.version < LATEST_VERSION {
        study = migrate_one_version(study)?;
    }
    Ok(study)
}

fn migrate_one_version(study: Study) -> Result<Study, StudyError> {
    match study.version {
        0 => migrate_v0_to_v1(study),
        v => Err(StudyError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 files stored `v_sat_v: 0` to request the IEC-derived value.
fn migrate_v0_to_v1(mut study: Study) -> Result<Study, StudyError> {
    for case in &mut study.cases {
        if case.params.v_sat_v == Some(0.0) {
            case.params.v_sat_v = None;
        }
    }
    study.version = 1;
    Ok(study)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CaseDef;
    use ct_sim::{ParameterSet, SimOptions};

    #[test]
    fn v0_zero_vsat_means_derived() {
        let study = Study {
            version: 0,
            name: "legacy".to_string(),
            description: None,
            cases: vec![CaseDef {
                id: "c1".to_string(),
                name: "Legacy".to_string(),
                params: ParameterSet {
                    v_sat_v: Some(0.0),
                    ..ParameterSet::default()
                },
                options: SimOptions::default(),
            }],
        };
        let migrated = migrate_to_latest(study).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.cases[0].params.v_sat_v, None);
    }
}
