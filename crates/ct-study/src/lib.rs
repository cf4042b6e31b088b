//! ct-study: study file format, validation, and preset library.

pub mod migrate;
pub mod presets;
pub mod schema;
pub mod validate;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use presets::{DEFAULT_PRESET_NAME, Preset, PresetLibrary, save_preset};
pub use schema::*;
pub use validate::{ValidationError, validate_case, validate_study};

pub type StudyResult<T> = Result<T, StudyError>;

#[derive(thiserror::Error, Debug)]
pub enum StudyError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &std::path::Path) -> StudyResult<Study> {
    let content = std::fs::read_to_string(path)?;
    let mut study: Study = serde_yaml::from_str(&content)?;
    study = migrate_to_latest(study)?;
    validate_study(&study)?;
    Ok(study)
}

pub fn save_yaml(path: &std::path::Path, study: &Study) -> StudyResult<()> {
    validate_study(study)?;
    let content = serde_yaml::to_string(study)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> StudyResult<Study> {
    let content = std::fs::read_to_string(path)?;
    let mut study: Study = serde_json::from_str(&content)?;
    study = migrate_to_latest(study)?;
    validate_study(&study)?;
    Ok(study)
}

pub fn save_json(path: &std::path::Path, study: &Study) -> StudyResult<()> {
    validate_study(study)?;
    let content = serde_json::to_string_pretty(study)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load(path: &std::path::Path) -> StudyResult<Study> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}
