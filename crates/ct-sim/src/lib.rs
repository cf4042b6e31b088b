//! Transient saturation engine for instrument current transformers.
//!
//! Provides:
//! - CT parameter set with validation and IEC saturation-voltage derivation
//! - Excitation models for STANDARD/TPX/TPY/TPZ cores
//! - Fixed-grid explicit-lag flux integrator
//! - Sliding one-cycle RMS window
//! - Latching saturation detector (voltage and current-deviation triggers)
//! - Run orchestration with cooperative cancellation

pub mod detector;
pub mod error;
pub mod excitation;
pub mod grid;
pub mod integrator;
pub mod params;
pub mod rms;
pub mod sim;
pub mod state;
pub mod summary;
pub mod warning;

// Re-exports for public API
pub use detector::{DetectorConfig, SaturationCause, SaturationDetector, SaturationVerdict};
pub use error::{SimError, SimResult};
pub use excitation::{CoreModel, ExcitationModel};
pub use grid::{MAX_GRID_SAMPLES, TimeGrid};
pub use integrator::{FluxIntegrator, FluxStep, IdealSecondaryCurrent};
pub use params::{CoreClass, MagnetizationCurve, ParameterSet, SaturationFactors};
pub use rms::{RmsReading, RmsWindow};
pub use sim::{
    CancelFlag, DEFAULT_CYCLES, DEFAULT_DEVIATION_THRESHOLD, DEFAULT_SAMPLES_PER_CYCLE,
    SimOptions, SimulationResult, SimulationRun, run, run_cancellable,
};
pub use state::SimulationState;
pub use summary::RequiredVoltages;
pub use warning::{ConfigurationWarning, check_configuration};
