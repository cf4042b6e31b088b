//! Content-based hashing for run IDs.

use ct_sim::{ParameterSet, SimOptions};
use sha2::{Digest, Sha256};

/// Run IDs cover the case id too, so two cases sharing parameters keep
/// separate run directories.
pub fn compute_run_id(
    case_id: &str,
    params: &ParameterSet,
    options: &SimOptions,
    solver_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(case_id.as_bytes());
    hasher.update([0u8]);

    let params_json = serde_json::to_string(params).unwrap_or_default();
    hasher.update(params_json.as_bytes());

    let options_json = serde_json::to_string(options).unwrap_or_default();
    hasher.update(options_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
