//! Study validation logic.

use crate::schema::{CaseDef, Study};
use ct_sim::TimeGrid;
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid case '{id}': {reason}")]
    InvalidCase { id: String, reason: String },

    #[error("Study '{name}' has no cases")]
    Empty { name: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_study(study: &Study) -> Result<(), ValidationError> {
    if study.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: study.version,
        });
    }

    if study.cases.is_empty() {
        return Err(ValidationError::Empty {
            name: study.name.clone(),
        });
    }

    let mut case_ids = HashSet::new();
    for case in &study.cases {
        if !case_ids.insert(&case.id) {
            return Err(ValidationError::DuplicateId {
                id: case.id.clone(),
                context: format!("study '{}' cases", study.name),
            });
        }
        validate_case(case)?;
    }

    Ok(())
}

pub fn validate_case(case: &CaseDef) -> Result<(), ValidationError> {
    if case.id.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "case.id".to_string(),
            value: format!("{:?}", case.id),
            reason: "must not be empty".to_string(),
        });
    }

    case.params
        .validate()
        .and_then(|()| case.options.validate())
        .and_then(|()| {
            let spc = case
                .options
                .resolve_samples_per_cycle(case.params.frequency_hz)?;
            TimeGrid::new(case.params.frequency(), spc, case.options.cycles).map(|_| ())
        })
        .map_err(|e| ValidationError::InvalidCase {
            id: case.id.clone(),
            reason: e.to_string(),
        })
}
