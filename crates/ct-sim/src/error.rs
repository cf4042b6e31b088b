//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while preparing or running a transient simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// An input invariant was violated; the simulation never started.
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: &'static str },

    /// Flux or current became non-finite mid-run.
    #[error(
        "Numeric divergence in {quantity} at step {step} (value {value}, last valid step {last_valid_step})"
    )]
    NumericDivergence {
        step: usize,
        last_valid_step: usize,
        quantity: &'static str,
        value: f64,
    },

    /// The run's cancellation flag was raised.
    #[error("Simulation cancelled at step {step}")]
    Cancelled { step: usize },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<ct_core::CoreError> for SimError {
    fn from(e: ct_core::CoreError) -> Self {
        use ct_core::CoreError;
        match e {
            CoreError::NonFinite { what, .. } | CoreError::InvalidArg { what } => {
                SimError::InvalidParameter { what }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_become_invalid_parameter() {
        let err: SimError = ct_core::ensure_positive(0.0, "turns_ratio")
            .unwrap_err()
            .into();
        assert_eq!(
            err,
            SimError::InvalidParameter {
                what: "turns_ratio"
            }
        );
    }

    #[test]
    fn divergence_message_names_last_valid_step() {
        let err = SimError::NumericDivergence {
            step: 12,
            last_valid_step: 11,
            quantity: "flux",
            value: f64::INFINITY,
        };
        let msg = err.to_string();
        assert!(msg.contains("flux"));
        assert!(msg.contains("last valid step 11"));
    }
}
