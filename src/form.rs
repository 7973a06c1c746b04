//! Form state for display surfaces
//!
//! Holds the three estimation inputs with the stepper semantics display
//! surfaces expect: values clamp at the moment of mutation, and every
//! mutation hands back a fresh estimate so a stale bedtime can never stay
//! on screen.

use crate::error::EstimateError;
use crate::estimator::BedtimeEstimator;
use crate::types::{CoffeeAmount, EstimationResult, SleepAmount, WakeTime};

/// Stateful form wrapping an estimator with the three user inputs.
///
/// Use this when a surface keeps inputs alive across interactions; for
/// one-shot calls, use [`BedtimeEstimator::estimate`] directly.
#[derive(Debug, Clone)]
pub struct BedtimeForm {
    estimator: BedtimeEstimator,
    wake_up: WakeTime,
    sleep_amount: SleepAmount,
    coffee_amount: CoffeeAmount,
}

impl BedtimeForm {
    /// Create a form at the default inputs (07:00, 8 hours, 2 cups)
    pub fn new(estimator: BedtimeEstimator) -> Self {
        Self {
            estimator,
            wake_up: WakeTime::default(),
            sleep_amount: SleepAmount::default(),
            coffee_amount: CoffeeAmount::default(),
        }
    }

    /// Create a form over the bundled artifact
    pub fn bundled() -> Result<Self, EstimateError> {
        Ok(Self::new(BedtimeEstimator::bundled()?))
    }

    pub fn wake_up(&self) -> WakeTime {
        self.wake_up
    }

    pub fn sleep_amount(&self) -> SleepAmount {
        self.sleep_amount
    }

    pub fn coffee_amount(&self) -> CoffeeAmount {
        self.coffee_amount
    }

    /// The estimator backing this form
    pub fn estimator(&self) -> &BedtimeEstimator {
        &self.estimator
    }

    /// Estimate for the current inputs, e.g. for the initial display
    pub fn current_estimate(&self) -> EstimationResult {
        self.estimator
            .estimate(self.wake_up, self.sleep_amount, self.coffee_amount)
    }

    /// Replace the wake-up time and re-estimate
    pub fn set_wake_up(&mut self, wake_up: WakeTime) -> EstimationResult {
        self.wake_up = wake_up;
        self.current_estimate()
    }

    /// Step the sleep target up by a quarter hour and re-estimate
    pub fn increment_sleep(&mut self) -> EstimationResult {
        self.sleep_amount = self.sleep_amount.increment();
        self.current_estimate()
    }

    /// Step the sleep target down by a quarter hour and re-estimate
    pub fn decrement_sleep(&mut self) -> EstimationResult {
        self.sleep_amount = self.sleep_amount.decrement();
        self.current_estimate()
    }

    /// Step the coffee intake up by one cup and re-estimate
    pub fn increment_coffee(&mut self) -> EstimationResult {
        self.coffee_amount = self.coffee_amount.increment();
        self.current_estimate()
    }

    /// Step the coffee intake down by one cup and re-estimate
    pub fn decrement_coffee(&mut self) -> EstimationResult {
        self.coffee_amount = self.coffee_amount.decrement();
        self.current_estimate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn make_test_form() -> BedtimeForm {
        BedtimeForm::bundled().unwrap()
    }

    #[test]
    fn test_form_starts_at_defaults() {
        let form = make_test_form();
        assert_eq!(form.wake_up(), WakeTime::default());
        assert_eq!(form.sleep_amount().hours(), 8.0);
        assert_eq!(form.coffee_amount().cups(), 2);
    }

    #[test]
    fn test_initial_estimate_matches_defaults() {
        let form = make_test_form();
        let result = form.current_estimate();
        let estimate = result.estimate().expect("defaults should estimate");
        assert_eq!(estimate.bedtime, NaiveTime::from_hms_opt(22, 51, 0).unwrap());
    }

    #[test]
    fn test_every_mutation_returns_fresh_estimate() {
        let mut form = make_test_form();
        let baseline = form.current_estimate();

        let after_coffee = form.increment_coffee();
        assert!(after_coffee.is_success());
        assert_ne!(after_coffee, baseline);

        let after_sleep = form.decrement_sleep();
        assert!(after_sleep.is_success());
        assert_ne!(after_sleep, after_coffee);

        let after_wake = form.set_wake_up(WakeTime::new(6, 0).unwrap());
        assert!(after_wake.is_success());
        assert_ne!(after_wake, after_sleep);
    }

    #[test]
    fn test_mutation_result_matches_current_estimate() {
        let mut form = make_test_form();
        let returned = form.increment_sleep();
        assert_eq!(returned, form.current_estimate());
    }

    #[test]
    fn test_steppers_clamp_at_bounds() {
        let mut form = make_test_form();

        for _ in 0..40 {
            form.increment_sleep();
        }
        assert_eq!(form.sleep_amount().hours(), 12.0);

        for _ in 0..80 {
            form.decrement_sleep();
        }
        assert_eq!(form.sleep_amount().hours(), 4.0);

        for _ in 0..30 {
            form.increment_coffee();
        }
        assert_eq!(form.coffee_amount().cups(), 20);

        for _ in 0..30 {
            form.decrement_coffee();
        }
        assert_eq!(form.coffee_amount().cups(), 1);
    }

    #[test]
    fn test_clamped_step_estimate_is_stable() {
        let mut form = make_test_form();
        for _ in 0..40 {
            form.increment_sleep();
        }

        // At the bound, further steps leave the estimate unchanged
        let at_bound = form.current_estimate();
        let after_extra_step = form.increment_sleep();
        assert_eq!(after_extra_step, at_bound);
    }

    #[test]
    fn test_more_coffee_moves_bedtime_earlier() {
        let mut form = make_test_form();
        let before = form.current_estimate().estimate().unwrap().bedtime;
        let after = form
            .increment_coffee()
            .estimate()
            .expect("estimate should survive a coffee step")
            .bedtime;
        assert!(after < before);
    }
}
