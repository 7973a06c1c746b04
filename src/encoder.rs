//! Report encoding
//!
//! This module encodes estimation outcomes into display-ready reports: the
//! exact title and message a display surface renders, plus producer and model
//! provenance metadata, serialized as a versioned JSON payload.

use crate::error::EstimateError;
use crate::model::ModelArtifact;
use crate::types::{
    CoffeeAmount, EstimateDisplay, EstimateReport, EstimationResult, ReportInputs, ReportProducer,
    ReportProvenance, SleepAmount, WakeTime,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{NaiveTime, Utc};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "rest.estimate.v1";

/// Title shown above a successful estimate.
///
/// The wording (including the typo) is contractual: display surfaces and
/// their snapshot tests pin these strings verbatim.
pub const SUCCESS_TITLE: &str = "You ideal bedtime is...";

/// Title shown above a failed estimate
pub const ERROR_TITLE: &str = "Error";

/// Display-ready body for any estimation failure
pub const FAILURE_MESSAGE: &str = "There was a problem calculating your bedtime";

/// Format a time of day in the short 12-hour style ("10:15 PM")
pub fn format_short_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Build the title/message pair a display surface renders for a result
pub fn display_for(result: &EstimationResult) -> EstimateDisplay {
    match result {
        EstimationResult::Success { estimate } => EstimateDisplay {
            title: SUCCESS_TITLE.to_string(),
            message: format_short_time(estimate.bedtime),
        },
        EstimationResult::Failure { reason } => EstimateDisplay {
            title: ERROR_TITLE.to_string(),
            message: reason.clone(),
        },
    }
}

/// Report encoder for producing display-surface payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode an estimation outcome into a report.
    ///
    /// `artifact` is the model the result came from; pass `None` when the
    /// model itself failed to load, leaving the provenance fields empty.
    pub fn encode(
        &self,
        wake_up: WakeTime,
        sleep_amount: SleepAmount,
        coffee_amount: CoffeeAmount,
        artifact: Option<&ModelArtifact>,
        result: EstimationResult,
    ) -> EstimateReport {
        // Build producer metadata
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        // Build provenance
        let provenance = ReportProvenance {
            model_id: artifact.map(|a| a.model_id.clone()),
            model_version: artifact.map(|a| a.model_version.clone()),
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        // Echo back the inputs the result was computed from
        let inputs = ReportInputs {
            wake_time: wake_up,
            sleep_hours: sleep_amount.hours(),
            coffee_cups: coffee_amount.cups(),
        };

        let display = display_for(&result);

        EstimateReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            inputs,
            result,
            display,
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        wake_up: WakeTime,
        sleep_amount: SleepAmount,
        coffee_amount: CoffeeAmount,
        artifact: Option<&ModelArtifact>,
        result: EstimationResult,
    ) -> Result<String, EstimateError> {
        let report = self.encode(wake_up, sleep_amount, coffee_amount, artifact, result);
        serde_json::to_string_pretty(&report).map_err(EstimateError::JsonError)
    }
}
