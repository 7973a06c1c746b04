//! Model artifact loading and prediction
//!
//! The engine treats the regression behind bedtime estimation as an opaque,
//! versioned artifact: a JSON document carrying ordered feature coefficients,
//! an intercept, and the unit of the predicted duration. Artifacts are
//! validated structurally on load; prediction is a dot product over the
//! declared features. Training happens offline and is out of scope here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::EstimateError;

/// Current model artifact schema version
pub const MODEL_SCHEMA_VERSION: &str = "rest.model.v1";

/// Feature names the estimator feeds, in artifact order
pub const EXPECTED_FEATURES: [&str; 3] =
    ["wake_seconds", "estimated_sleep_hours", "coffee_cups"];

/// Artifact shipped inside the engine binary
const BUNDLED_ARTIFACT: &str = include_str!("../model/sleep_calculator.v1.json");

/// Unit of the artifact's predicted sleep duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputUnit {
    Seconds,
    Hours,
}

impl OutputUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputUnit::Seconds => "seconds",
            OutputUnit::Hours => "hours",
        }
    }
}

/// One regression feature: name plus fitted coefficient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFeature {
    pub name: String,
    pub coefficient: f64,
}

/// Pre-trained linear regression artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Schema version identifier
    pub schema_version: String,
    /// Stable identifier of the model family
    pub model_id: String,
    /// Version of this particular fit
    pub model_version: String,
    /// When the fit was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
    /// Free-form description of the training data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered regression features
    pub features: Vec<ModelFeature>,
    /// Regression intercept
    pub intercept: f64,
    /// Unit of the predicted duration
    pub output_unit: OutputUnit,
}

impl ModelArtifact {
    /// Parse and validate an artifact from a JSON document
    pub fn from_json(json: &str) -> Result<Self, EstimateError> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Read, parse, and validate an artifact file
    pub fn from_file(path: &Path) -> Result<Self, EstimateError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| EstimateError::ArtifactRead(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Load the artifact bundled with the engine
    pub fn bundled() -> Result<Self, EstimateError> {
        Self::from_json(BUNDLED_ARTIFACT)
    }

    /// Validate the artifact structure against the current schema
    pub fn validate(&self) -> Result<(), EstimateError> {
        if self.schema_version != MODEL_SCHEMA_VERSION {
            return Err(EstimateError::SchemaVersion {
                expected: MODEL_SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        if self.features.len() != EXPECTED_FEATURES.len() {
            return Err(EstimateError::MalformedArtifact(format!(
                "expected {} features, got {}",
                EXPECTED_FEATURES.len(),
                self.features.len()
            )));
        }

        for (feature, expected) in self.features.iter().zip(EXPECTED_FEATURES) {
            if feature.name != expected {
                return Err(EstimateError::MalformedArtifact(format!(
                    "expected feature {expected:?}, got {:?}",
                    feature.name
                )));
            }
            if !feature.coefficient.is_finite() {
                return Err(EstimateError::MalformedArtifact(format!(
                    "non-finite coefficient for {:?}",
                    feature.name
                )));
            }
        }

        if !self.intercept.is_finite() {
            return Err(EstimateError::MalformedArtifact(
                "non-finite intercept".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply the regression to a feature vector in artifact order.
    ///
    /// Returns the predicted sleep duration in the artifact's own unit.
    pub fn predict(&self, features: &[f64]) -> Result<f64, EstimateError> {
        if features.len() != self.features.len() {
            return Err(EstimateError::PredictionError(format!(
                "expected {} features, got {}",
                self.features.len(),
                features.len()
            )));
        }

        let mut prediction = self.intercept;
        for (feature, value) in self.features.iter().zip(features) {
            prediction += feature.coefficient * value;
        }

        if !prediction.is_finite() {
            return Err(EstimateError::PredictionError(
                "prediction is not a finite number".to_string(),
            ));
        }

        Ok(prediction)
    }

    /// Predicted sleep duration in seconds, whatever the artifact's unit.
    ///
    /// A negative duration means the fit cannot describe these inputs and is
    /// reported as a prediction error rather than an absurd bedtime.
    pub fn predict_seconds(&self, features: &[f64]) -> Result<f64, EstimateError> {
        let raw = self.predict(features)?;
        let seconds = match self.output_unit {
            OutputUnit::Seconds => raw,
            OutputUnit::Hours => raw * 3600.0,
        };

        if seconds < 0.0 {
            return Err(EstimateError::PredictionError(format!(
                "predicted sleep duration is negative ({seconds:.1}s)"
            )));
        }

        Ok(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_artifact() -> ModelArtifact {
        ModelArtifact {
            schema_version: MODEL_SCHEMA_VERSION.to_string(),
            model_id: "test-model".to_string(),
            model_version: "0.0.1".to_string(),
            trained_at: None,
            description: None,
            features: vec![
                ModelFeature {
                    name: "wake_seconds".to_string(),
                    coefficient: 0.0,
                },
                ModelFeature {
                    name: "estimated_sleep_hours".to_string(),
                    coefficient: 3600.0,
                },
                ModelFeature {
                    name: "coffee_cups".to_string(),
                    coefficient: 0.0,
                },
            ],
            intercept: 0.0,
            output_unit: OutputUnit::Seconds,
        }
    }

    #[test]
    fn test_bundled_artifact_loads_and_validates() {
        let artifact = ModelArtifact::bundled().unwrap();
        assert_eq!(artifact.schema_version, MODEL_SCHEMA_VERSION);
        assert_eq!(artifact.model_id, "sleep-calculator");
        assert_eq!(artifact.output_unit, OutputUnit::Seconds);
        assert_eq!(artifact.features.len(), 3);
    }

    #[test]
    fn test_bundled_artifact_prediction_at_defaults() {
        let artifact = ModelArtifact::bundled().unwrap();
        let prediction = artifact.predict_seconds(&[25200.0, 8.0, 2.0]).unwrap();
        assert!((prediction - 29340.0).abs() < 0.001);
    }

    #[test]
    fn test_from_json_rejects_malformed_document() {
        assert!(ModelArtifact::from_json("not json at all").is_err());
        assert!(ModelArtifact::from_json("{}").is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_schema_version() {
        let mut artifact = make_test_artifact();
        artifact.schema_version = "rest.model.v9".to_string();
        let err = artifact.validate().unwrap_err();
        assert!(matches!(err, EstimateError::SchemaVersion { .. }));
    }

    #[test]
    fn test_validate_rejects_wrong_feature_count() {
        let mut artifact = make_test_artifact();
        artifact.features.pop();
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_misnamed_feature() {
        let mut artifact = make_test_artifact();
        artifact.features[1].name = "tea_cups".to_string();
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_terms() {
        let mut artifact = make_test_artifact();
        artifact.features[0].coefficient = f64::NAN;
        assert!(artifact.validate().is_err());

        let mut artifact = make_test_artifact();
        artifact.intercept = f64::INFINITY;
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_predict_rejects_feature_arity_mismatch() {
        let artifact = make_test_artifact();
        assert!(artifact.predict(&[1.0, 2.0]).is_err());
        assert!(artifact.predict(&[1.0, 2.0, 3.0, 4.0]).is_err());
    }

    #[test]
    fn test_predict_is_deterministic() {
        let artifact = ModelArtifact::bundled().unwrap();
        let features = [36900.0, 7.25, 5.0];
        let first = artifact.predict(&features).unwrap();
        let second = artifact.predict(&features).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_predict_seconds_converts_hours_unit() {
        let mut artifact = make_test_artifact();
        artifact.output_unit = OutputUnit::Hours;
        artifact.features[1].coefficient = 1.0;
        artifact.intercept = 0.25;

        // 8h target plus the intercept, declared in hours
        let seconds = artifact.predict_seconds(&[25200.0, 8.0, 2.0]).unwrap();
        assert!((seconds - 29700.0).abs() < 0.001);
    }

    #[test]
    fn test_predict_seconds_rejects_negative_duration() {
        let mut artifact = make_test_artifact();
        artifact.intercept = -90000.0;
        let err = artifact.predict_seconds(&[25200.0, 8.0, 2.0]).unwrap_err();
        assert!(matches!(err, EstimateError::PredictionError(_)));
    }

    #[test]
    fn test_from_file_reports_missing_path() {
        let err = ModelArtifact::from_file(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, EstimateError::ArtifactRead(_)));
    }

    #[test]
    fn test_artifact_serde_round_trip() {
        let artifact = ModelArtifact::bundled().unwrap();
        let json = serde_json::to_string(&artifact).unwrap();
        let parsed = ModelArtifact::from_json(&json).unwrap();
        assert_eq!(parsed.model_id, artifact.model_id);
        assert_eq!(parsed.intercept, artifact.intercept);
    }
}
