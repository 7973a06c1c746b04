//! Core types for the Restwise estimation pipeline
//!
//! This module defines the data structures that flow through the pipeline:
//! clamped form inputs, the estimation outcome, and the report payload handed
//! to display surfaces.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EstimateError;

/// Time of day the user wants to wake up (no date component)
///
/// Always carries a valid hour/minute pair; construction and
/// deserialization reject anything outside 00:00-23:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWakeTime")]
pub struct WakeTime {
    hour: u32,
    minute: u32,
}

impl WakeTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, EstimateError> {
        if hour > 23 || minute > 59 {
            return Err(EstimateError::InvalidTime { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Scalar fed to the model: seconds elapsed since midnight.
    ///
    /// Midnight itself encodes as exactly 0, not 86400.
    pub fn seconds_from_midnight(&self) -> u32 {
        self.hour * 3600 + self.minute * 60
    }

    /// Time-of-day view for clock arithmetic
    pub fn to_naive(&self) -> NaiveTime {
        // Construction guarantees a valid hour/minute pair
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }
}

impl Default for WakeTime {
    /// 07:00, the wake-up time display surfaces start from
    fn default() -> Self {
        Self { hour: 7, minute: 0 }
    }
}

impl FromStr for WakeTime {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || EstimateError::TimeParseError(format!("expected HH:MM, got {s:?}"));
        let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
        let hour: u32 = h.parse().map_err(|_| bad())?;
        let minute: u32 = m.parse().map_err(|_| bad())?;
        Self::new(hour, minute)
    }
}

impl fmt::Display for WakeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Unvalidated wire form of [`WakeTime`]
#[derive(Deserialize)]
struct RawWakeTime {
    hour: u32,
    minute: u32,
}

impl TryFrom<RawWakeTime> for WakeTime {
    type Error = EstimateError;

    fn try_from(raw: RawWakeTime) -> Result<Self, Self::Error> {
        Self::new(raw.hour, raw.minute)
    }
}

/// Desired amount of sleep in hours, clamped to the supported range
///
/// Values settle into [4.0, 12.0] at the moment of construction, mutation,
/// or deserialization; no out-of-range amount ever reaches the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct SleepAmount(f64);

impl SleepAmount {
    /// Minimum supported sleep target (hours)
    pub const MIN_HOURS: f64 = 4.0;
    /// Maximum supported sleep target (hours)
    pub const MAX_HOURS: f64 = 12.0;
    /// Stepper adjustment size (hours)
    pub const STEP_HOURS: f64 = 0.25;

    /// Create a sleep amount, clamping into the supported range
    pub fn new(hours: f64) -> Self {
        if hours.is_nan() {
            // NaN has no position in the range; settle on the lower bound
            return Self(Self::MIN_HOURS);
        }
        Self(hours.clamp(Self::MIN_HOURS, Self::MAX_HOURS))
    }

    pub fn hours(&self) -> f64 {
        self.0
    }

    /// One stepper increment, clamped at the upper bound
    pub fn increment(self) -> Self {
        Self::new(self.0 + Self::STEP_HOURS)
    }

    /// One stepper decrement, clamped at the lower bound
    pub fn decrement(self) -> Self {
        Self::new(self.0 - Self::STEP_HOURS)
    }
}

impl Default for SleepAmount {
    /// 8 hours, the sleep target display surfaces start from
    fn default() -> Self {
        Self(8.0)
    }
}

impl From<f64> for SleepAmount {
    /// Clamps like [`SleepAmount::new`]
    fn from(hours: f64) -> Self {
        Self::new(hours)
    }
}

impl From<SleepAmount> for f64 {
    fn from(amount: SleepAmount) -> f64 {
        amount.0
    }
}

impl fmt::Display for SleepAmount {
    /// Renders without trailing zeros ("8", "8.25")
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Daily coffee intake in cups, clamped to the supported range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct CoffeeAmount(u32);

impl CoffeeAmount {
    /// Minimum supported intake (cups)
    pub const MIN_CUPS: u32 = 1;
    /// Maximum supported intake (cups)
    pub const MAX_CUPS: u32 = 20;

    /// Create a coffee amount, clamping into the supported range
    pub fn new(cups: u32) -> Self {
        Self(cups.clamp(Self::MIN_CUPS, Self::MAX_CUPS))
    }

    pub fn cups(&self) -> u32 {
        self.0
    }

    /// One stepper increment, clamped at the upper bound
    pub fn increment(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    /// One stepper decrement, clamped at the lower bound
    pub fn decrement(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }

    /// Display label with unit ("1 cup", "3 cups")
    pub fn label(&self) -> String {
        if self.0 == 1 {
            "1 cup".to_string()
        } else {
            format!("{} cups", self.0)
        }
    }
}

impl Default for CoffeeAmount {
    /// 2 cups, the intake display surfaces start from
    fn default() -> Self {
        Self(2)
    }
}

impl From<u32> for CoffeeAmount {
    /// Clamps like [`CoffeeAmount::new`]
    fn from(cups: u32) -> Self {
        Self::new(cups)
    }
}

impl From<CoffeeAmount> for u32 {
    fn from(amount: CoffeeAmount) -> u32 {
        amount.0
    }
}

/// Successful estimation payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BedtimeEstimate {
    /// Suggested bedtime as a time of day (wraps across midnight)
    pub bedtime: NaiveTime,
    /// Sleep duration the model predicted (seconds)
    pub predicted_sleep_seconds: f64,
}

/// Outcome of a bedtime estimation call
///
/// Failures carry a display-ready reason; callers never see a partial result
/// or a panic from the estimation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EstimationResult {
    Success { estimate: BedtimeEstimate },
    Failure { reason: String },
}

impl EstimationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, EstimationResult::Success { .. })
    }

    pub fn estimate(&self) -> Option<&BedtimeEstimate> {
        match self {
            EstimationResult::Success { estimate } => Some(estimate),
            EstimationResult::Failure { .. } => None,
        }
    }
}

/// Report producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Provenance of the model behind an encoded report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProvenance {
    /// Identifier of the model family, when a model was loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Version of the loaded model fit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    pub computed_at_utc: String,
}

/// Inputs echoed back in an encoded report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInputs {
    pub wake_time: WakeTime,
    pub sleep_hours: f64,
    pub coffee_cups: u32,
}

/// Title/message pair a display surface renders verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateDisplay {
    pub title: String,
    pub message: String,
}

/// Complete encoded estimate handed to display surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub inputs: ReportInputs,
    pub result: EstimationResult,
    pub display: EstimateDisplay,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wake_time_valid_construction() {
        let wake = WakeTime::new(7, 0).unwrap();
        assert_eq!(wake.hour(), 7);
        assert_eq!(wake.minute(), 0);
    }

    #[test]
    fn test_wake_time_rejects_out_of_range() {
        assert!(WakeTime::new(24, 0).is_err());
        assert!(WakeTime::new(7, 60).is_err());
        assert!(WakeTime::new(99, 99).is_err());
    }

    #[test]
    fn test_wake_time_seconds_from_midnight() {
        assert_eq!(WakeTime::new(7, 0).unwrap().seconds_from_midnight(), 25200);
        assert_eq!(WakeTime::new(10, 15).unwrap().seconds_from_midnight(), 36900);
        assert_eq!(WakeTime::new(23, 59).unwrap().seconds_from_midnight(), 86340);
    }

    #[test]
    fn test_wake_time_midnight_is_zero() {
        assert_eq!(WakeTime::new(0, 0).unwrap().seconds_from_midnight(), 0);
    }

    #[test]
    fn test_wake_time_default() {
        let wake = WakeTime::default();
        assert_eq!(wake.hour(), 7);
        assert_eq!(wake.minute(), 0);
    }

    #[test]
    fn test_wake_time_parse() {
        let wake: WakeTime = "06:30".parse().unwrap();
        assert_eq!(wake.hour(), 6);
        assert_eq!(wake.minute(), 30);

        assert!("25:00".parse::<WakeTime>().is_err());
        assert!("0630".parse::<WakeTime>().is_err());
        assert!("six:thirty".parse::<WakeTime>().is_err());
    }

    #[test]
    fn test_wake_time_display() {
        assert_eq!(WakeTime::new(6, 5).unwrap().to_string(), "06:05");
        assert_eq!(WakeTime::new(23, 59).unwrap().to_string(), "23:59");
    }

    #[test]
    fn test_wake_time_deserialize_rejects_out_of_range() {
        // JSON goes through the same validation as construction
        assert!(serde_json::from_str::<WakeTime>(r#"{"hour":99,"minute":99}"#).is_err());
        assert!(serde_json::from_str::<WakeTime>(r#"{"hour":24,"minute":0}"#).is_err());
        assert!(serde_json::from_str::<WakeTime>(r#"{"hour":7,"minute":60}"#).is_err());
    }

    #[test]
    fn test_wake_time_serde_round_trip() {
        let wake = WakeTime::new(23, 59).unwrap();
        let json = serde_json::to_string(&wake).unwrap();
        assert_eq!(json, r#"{"hour":23,"minute":59}"#);

        let parsed: WakeTime = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, wake);
    }

    #[test]
    fn test_sleep_amount_clamps_on_construction() {
        assert_eq!(SleepAmount::new(8.0).hours(), 8.0);
        assert_eq!(SleepAmount::new(3.0).hours(), 4.0);
        assert_eq!(SleepAmount::new(13.0).hours(), 12.0);
        assert_eq!(SleepAmount::new(f64::NEG_INFINITY).hours(), 4.0);
        assert_eq!(SleepAmount::new(f64::NAN).hours(), 4.0);
    }

    #[test]
    fn test_sleep_amount_stepping() {
        let amount = SleepAmount::new(8.0);
        assert_eq!(amount.increment().hours(), 8.25);
        assert_eq!(amount.decrement().hours(), 7.75);
    }

    #[test]
    fn test_sleep_amount_clamps_at_bounds() {
        let max = SleepAmount::new(12.0);
        assert_eq!(max.increment().hours(), 12.0);

        let min = SleepAmount::new(4.0);
        assert_eq!(min.decrement().hours(), 4.0);

        // A step that would overshoot lands exactly on the bound
        assert_eq!(SleepAmount::new(11.9).increment().hours(), 12.0);
        assert_eq!(SleepAmount::new(4.1).decrement().hours(), 4.0);
    }

    #[test]
    fn test_sleep_amount_display_drops_trailing_zeros() {
        assert_eq!(SleepAmount::new(8.0).to_string(), "8");
        assert_eq!(SleepAmount::new(8.25).to_string(), "8.25");
        assert_eq!(SleepAmount::new(10.5).to_string(), "10.5");
    }

    #[test]
    fn test_coffee_amount_clamps_on_construction() {
        assert_eq!(CoffeeAmount::new(2).cups(), 2);
        assert_eq!(CoffeeAmount::new(0).cups(), 1);
        assert_eq!(CoffeeAmount::new(50).cups(), 20);
    }

    #[test]
    fn test_coffee_amount_stepping() {
        assert_eq!(CoffeeAmount::new(2).increment().cups(), 3);
        assert_eq!(CoffeeAmount::new(2).decrement().cups(), 1);
        assert_eq!(CoffeeAmount::new(20).increment().cups(), 20);
        assert_eq!(CoffeeAmount::new(1).decrement().cups(), 1);
    }

    #[test]
    fn test_coffee_amount_label_pluralization() {
        assert_eq!(CoffeeAmount::new(1).label(), "1 cup");
        assert_eq!(CoffeeAmount::new(2).label(), "2 cups");
        assert_eq!(CoffeeAmount::new(20).label(), "20 cups");
    }

    #[test]
    fn test_amounts_clamp_on_deserialize() {
        let sleep: SleepAmount = serde_json::from_str("99.0").unwrap();
        assert_eq!(sleep.hours(), 12.0);
        let sleep: SleepAmount = serde_json::from_str("0.5").unwrap();
        assert_eq!(sleep.hours(), 4.0);

        let coffee: CoffeeAmount = serde_json::from_str("0").unwrap();
        assert_eq!(coffee.cups(), 1);
        let coffee: CoffeeAmount = serde_json::from_str("50").unwrap();
        assert_eq!(coffee.cups(), 20);

        // In-range values pass through untouched and re-serialize bare
        let sleep: SleepAmount = serde_json::from_str("8.25").unwrap();
        assert_eq!(serde_json::to_string(&sleep).unwrap(), "8.25");
    }

    #[test]
    fn test_estimation_result_serde_tagging() {
        let failure = EstimationResult::Failure {
            reason: "broken".to_string(),
        };
        let json = serde_json::to_string(&failure).unwrap();
        assert!(json.contains("\"status\":\"failure\""));
        assert!(json.contains("\"reason\":\"broken\""));

        let parsed: EstimationResult = serde_json::from_str(&json).unwrap();
        assert!(!parsed.is_success());
        assert!(parsed.estimate().is_none());
    }

    #[test]
    fn test_estimation_result_accessors() {
        let estimate = BedtimeEstimate {
            bedtime: NaiveTime::from_hms_opt(22, 51, 0).unwrap(),
            predicted_sleep_seconds: 29340.0,
        };
        let result = EstimationResult::Success { estimate };
        assert!(result.is_success());
        assert_eq!(result.estimate().unwrap().predicted_sleep_seconds, 29340.0);
    }
}
