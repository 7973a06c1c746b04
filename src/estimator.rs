//! Estimation pipeline
//!
//! This module provides the public API for computing a bedtime.
//! It orchestrates the full pipeline from form inputs to a suggested bedtime.
//!
//! Pipeline stages:
//! 1. Feature encoding - wake time becomes seconds since midnight
//! 2. Model prediction - the artifact predicts the actual sleep duration
//! 3. Bedtime derivation - wake time minus predicted duration, wrapping
//!    across midnight
//!
//! Entry points never panic and never leak partial results: any model
//! failure collapses into `EstimationResult::Failure` carrying the fixed
//! display message.

use chrono::{Duration, NaiveTime};

use crate::encoder::FAILURE_MESSAGE;
use crate::error::EstimateError;
use crate::model::ModelArtifact;
use crate::types::{BedtimeEstimate, CoffeeAmount, EstimationResult, SleepAmount, WakeTime};

/// Estimator bound to a loaded model artifact.
///
/// Stateless and cheap to clone; the same inputs always produce the same
/// result against the same artifact.
#[derive(Debug, Clone)]
pub struct BedtimeEstimator {
    artifact: ModelArtifact,
}

impl BedtimeEstimator {
    /// Create an estimator over an already-validated artifact
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Create an estimator over the bundled artifact
    pub fn bundled() -> Result<Self, EstimateError> {
        Ok(Self::new(ModelArtifact::bundled()?))
    }

    /// The artifact this estimator predicts with
    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Estimate the optimal bedtime for the given inputs.
    ///
    /// All-or-nothing: a prediction failure yields `Failure` with the fixed
    /// display message, never a partial estimate.
    ///
    /// # Example
    /// ```ignore
    /// let estimator = BedtimeEstimator::bundled()?;
    /// let result = estimator.estimate(
    ///     WakeTime::default(),
    ///     SleepAmount::default(),
    ///     CoffeeAmount::default(),
    /// );
    /// ```
    pub fn estimate(
        &self,
        wake_up: WakeTime,
        sleep_amount: SleepAmount,
        coffee_amount: CoffeeAmount,
    ) -> EstimationResult {
        match self.try_estimate(wake_up, sleep_amount, coffee_amount) {
            Ok(estimate) => EstimationResult::Success { estimate },
            Err(_) => EstimationResult::Failure {
                reason: FAILURE_MESSAGE.to_string(),
            },
        }
    }

    fn try_estimate(
        &self,
        wake_up: WakeTime,
        sleep_amount: SleepAmount,
        coffee_amount: CoffeeAmount,
    ) -> Result<BedtimeEstimate, EstimateError> {
        // Stage 1: Encode inputs as the model's feature vector
        let features = encode_features(wake_up, sleep_amount, coffee_amount);

        // Stage 2: Predict the actual sleep duration
        let predicted_sleep_seconds = self.artifact.predict_seconds(&features)?;

        // Stage 3: Derive the bedtime on the clock face
        let bedtime = subtract_from_wake(wake_up, predicted_sleep_seconds);

        Ok(BedtimeEstimate {
            bedtime,
            predicted_sleep_seconds,
        })
    }
}

/// Estimate with the bundled artifact, loading it for this call.
///
/// A load failure reports the same way as a prediction failure. Callers that
/// estimate repeatedly should hold a [`BedtimeEstimator`] instead.
pub fn estimate_bundled(
    wake_up: WakeTime,
    sleep_amount: SleepAmount,
    coffee_amount: CoffeeAmount,
) -> EstimationResult {
    match BedtimeEstimator::bundled() {
        Ok(estimator) => estimator.estimate(wake_up, sleep_amount, coffee_amount),
        Err(_) => EstimationResult::Failure {
            reason: FAILURE_MESSAGE.to_string(),
        },
    }
}

/// Estimate against a caller-supplied artifact JSON document.
///
/// Used by surfaces that inject model updates at runtime; a malformed
/// document reports the same way as any other model failure.
pub fn estimate_with_artifact_json(
    artifact_json: &str,
    wake_up: WakeTime,
    sleep_amount: SleepAmount,
    coffee_amount: CoffeeAmount,
) -> EstimationResult {
    match ModelArtifact::from_json(artifact_json) {
        Ok(artifact) => BedtimeEstimator::new(artifact).estimate(wake_up, sleep_amount, coffee_amount),
        Err(_) => EstimationResult::Failure {
            reason: FAILURE_MESSAGE.to_string(),
        },
    }
}

/// Encode inputs as the model's feature vector, in artifact order
fn encode_features(
    wake_up: WakeTime,
    sleep_amount: SleepAmount,
    coffee_amount: CoffeeAmount,
) -> [f64; 3] {
    [
        f64::from(wake_up.seconds_from_midnight()),
        sleep_amount.hours(),
        f64::from(coffee_amount.cups()),
    ]
}

/// Subtract the predicted duration from the wake time on the clock face.
///
/// The subtraction wraps across midnight and the day offset is discarded:
/// bedtime is a pure time of day, carried to millisecond precision.
fn subtract_from_wake(wake_up: WakeTime, predicted_seconds: f64) -> NaiveTime {
    let millis = (predicted_seconds * 1000.0).round() as i64;
    let (bedtime, _) = wake_up
        .to_naive()
        .overflowing_sub_signed(Duration::milliseconds(millis));
    bedtime
}
