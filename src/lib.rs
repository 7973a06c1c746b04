//! Restwise Core - On-device bedtime estimation engine
//!
//! Restwise turns a desired wake-up time, a sleep target, and daily caffeine
//! intake into a suggested bedtime through a deterministic pipeline: feature
//! encoding → model prediction → bedtime derivation → report encoding.
//!
//! The regression behind the prediction ships as a pre-trained, versioned
//! artifact bundled into the engine. Display surfaces (mobile apps over FFI,
//! terminals over the CLI) supply inputs and render the encoded report
//! verbatim; no estimation logic lives on the display side.

pub mod encoder;
pub mod error;
pub mod estimator;
pub mod form;
pub mod model;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::EstimateError;
pub use estimator::{estimate_bundled, estimate_with_artifact_json, BedtimeEstimator};
pub use form::BedtimeForm;

// Model exports
pub use model::{ModelArtifact, MODEL_SCHEMA_VERSION};

// Core type exports
pub use types::{BedtimeEstimate, CoffeeAmount, EstimationResult, SleepAmount, WakeTime};

/// Engine version embedded in all encoded reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for encoded reports
pub const PRODUCER_NAME: &str = "restwise-core";
