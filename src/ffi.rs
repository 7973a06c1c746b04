//! FFI bindings for Restwise Core
//!
//! This module provides C-compatible functions for calling the engine from
//! other languages. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using
//! `restwise_free_string`.
//!
//! Model failures are not API errors: they come back as reports whose
//! display pair already carries the error title and message. NULL returns
//! are reserved for API misuse (bad pointers, out-of-range times).

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::encoder::{ReportEncoder, FAILURE_MESSAGE};
use crate::estimator::BedtimeEstimator;
use crate::form::BedtimeForm;
use crate::model::ModelArtifact;
use crate::types::{CoffeeAmount, EstimationResult, SleepAmount, WakeTime};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Helper to encode a result into a report JSON C string
fn report_to_cstr(
    encoder: &ReportEncoder,
    wake_up: WakeTime,
    sleep_amount: SleepAmount,
    coffee_amount: CoffeeAmount,
    artifact: Option<&ModelArtifact>,
    result: EstimationResult,
) -> *mut c_char {
    match encoder.encode_to_json(wake_up, sleep_amount, coffee_amount, artifact, result) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Estimate a bedtime with the bundled model and return a report JSON.
///
/// Out-of-range sleep hours and coffee cups are clamped, matching stepper
/// semantics on the display side.
///
/// # Safety
/// - `wake_hour` must be 0-23 and `wake_minute` 0-59.
/// - Returns a newly allocated string that must be freed with `restwise_free_string`.
/// - Returns NULL on API misuse; call `restwise_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn restwise_estimate(
    wake_hour: u32,
    wake_minute: u32,
    sleep_hours: f64,
    coffee_cups: u32,
) -> *mut c_char {
    clear_last_error();

    let wake_up = match WakeTime::new(wake_hour, wake_minute) {
        Ok(wake) => wake,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let sleep_amount = SleepAmount::new(sleep_hours);
    let coffee_amount = CoffeeAmount::new(coffee_cups);
    let encoder = ReportEncoder::new();

    match BedtimeEstimator::bundled() {
        Ok(estimator) => {
            let result = estimator.estimate(wake_up, sleep_amount, coffee_amount);
            report_to_cstr(
                &encoder,
                wake_up,
                sleep_amount,
                coffee_amount,
                Some(estimator.artifact()),
                result,
            )
        }
        Err(_) => {
            let result = EstimationResult::Failure {
                reason: FAILURE_MESSAGE.to_string(),
            };
            report_to_cstr(&encoder, wake_up, sleep_amount, coffee_amount, None, result)
        }
    }
}

/// Estimate a bedtime with a caller-supplied model artifact JSON.
///
/// A malformed artifact is not an API error: the returned report carries the
/// failure display pair and empty model provenance.
///
/// # Safety
/// - `model_json` must be a valid null-terminated C string.
/// - `wake_hour` must be 0-23 and `wake_minute` 0-59.
/// - Returns a newly allocated string that must be freed with `restwise_free_string`.
/// - Returns NULL on API misuse; call `restwise_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn restwise_estimate_with_model(
    model_json: *const c_char,
    wake_hour: u32,
    wake_minute: u32,
    sleep_hours: f64,
    coffee_cups: u32,
) -> *mut c_char {
    clear_last_error();

    let model_str = match cstr_to_string(model_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model JSON string pointer");
            return ptr::null_mut();
        }
    };

    let wake_up = match WakeTime::new(wake_hour, wake_minute) {
        Ok(wake) => wake,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let sleep_amount = SleepAmount::new(sleep_hours);
    let coffee_amount = CoffeeAmount::new(coffee_cups);
    let encoder = ReportEncoder::new();

    match ModelArtifact::from_json(&model_str) {
        Ok(artifact) => {
            let estimator = BedtimeEstimator::new(artifact);
            let result = estimator.estimate(wake_up, sleep_amount, coffee_amount);
            report_to_cstr(
                &encoder,
                wake_up,
                sleep_amount,
                coffee_amount,
                Some(estimator.artifact()),
                result,
            )
        }
        Err(_) => {
            let result = EstimationResult::Failure {
                reason: FAILURE_MESSAGE.to_string(),
            };
            report_to_cstr(&encoder, wake_up, sleep_amount, coffee_amount, None, result)
        }
    }
}

// ============================================================================
// Stateful Form API
// ============================================================================

/// Opaque handle to a BedtimeForm
pub struct RestwiseFormHandle {
    form: BedtimeForm,
    encoder: ReportEncoder,
}

impl RestwiseFormHandle {
    fn report(&self, result: EstimationResult) -> *mut c_char {
        report_to_cstr(
            &self.encoder,
            self.form.wake_up(),
            self.form.sleep_amount(),
            self.form.coffee_amount(),
            Some(self.form.estimator().artifact()),
            result,
        )
    }
}

/// Create a new form over the bundled model at the default inputs.
///
/// # Safety
/// - Returns a pointer to a newly allocated form.
/// - Must be freed with `restwise_form_free`.
/// - Returns NULL on error; call `restwise_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn restwise_form_new() -> *mut RestwiseFormHandle {
    clear_last_error();

    match BedtimeForm::bundled() {
        Ok(form) => {
            let handle = Box::new(RestwiseFormHandle {
                form,
                encoder: ReportEncoder::new(),
            });
            Box::into_raw(handle)
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a form.
///
/// # Safety
/// - `form` must be a valid pointer returned by `restwise_form_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn restwise_form_free(form: *mut RestwiseFormHandle) {
    if !form.is_null() {
        drop(Box::from_raw(form));
    }
}

/// Estimate for the form's current inputs and return a report JSON.
///
/// # Safety
/// - `form` must be a valid pointer returned by `restwise_form_new`.
/// - Returns a newly allocated string that must be freed with `restwise_free_string`.
/// - Returns NULL on error; call `restwise_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn restwise_form_estimate(form: *mut RestwiseFormHandle) -> *mut c_char {
    clear_last_error();

    if form.is_null() {
        set_last_error("Null form pointer");
        return ptr::null_mut();
    }

    let handle = &*form;
    handle.report(handle.form.current_estimate())
}

/// Set the form's wake-up time and return a fresh report JSON.
///
/// # Safety
/// - `form` must be a valid pointer returned by `restwise_form_new`.
/// - `wake_hour` must be 0-23 and `wake_minute` 0-59.
/// - Returns a newly allocated string that must be freed with `restwise_free_string`.
/// - Returns NULL on error; call `restwise_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn restwise_form_set_wake(
    form: *mut RestwiseFormHandle,
    wake_hour: u32,
    wake_minute: u32,
) -> *mut c_char {
    clear_last_error();

    if form.is_null() {
        set_last_error("Null form pointer");
        return ptr::null_mut();
    }

    let handle = &mut *form;

    let wake_up = match WakeTime::new(wake_hour, wake_minute) {
        Ok(wake) => wake,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let result = handle.form.set_wake_up(wake_up);
    handle.report(result)
}

/// Step the form's sleep target up by a quarter hour and return a fresh report JSON.
///
/// # Safety
/// - `form` must be a valid pointer returned by `restwise_form_new`.
/// - Returns a newly allocated string that must be freed with `restwise_free_string`.
/// - Returns NULL on error; call `restwise_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn restwise_form_increment_sleep(
    form: *mut RestwiseFormHandle,
) -> *mut c_char {
    clear_last_error();

    if form.is_null() {
        set_last_error("Null form pointer");
        return ptr::null_mut();
    }

    let handle = &mut *form;
    let result = handle.form.increment_sleep();
    handle.report(result)
}

/// Step the form's sleep target down by a quarter hour and return a fresh report JSON.
///
/// # Safety
/// - `form` must be a valid pointer returned by `restwise_form_new`.
/// - Returns a newly allocated string that must be freed with `restwise_free_string`.
/// - Returns NULL on error; call `restwise_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn restwise_form_decrement_sleep(
    form: *mut RestwiseFormHandle,
) -> *mut c_char {
    clear_last_error();

    if form.is_null() {
        set_last_error("Null form pointer");
        return ptr::null_mut();
    }

    let handle = &mut *form;
    let result = handle.form.decrement_sleep();
    handle.report(result)
}

/// Step the form's coffee intake up by one cup and return a fresh report JSON.
///
/// # Safety
/// - `form` must be a valid pointer returned by `restwise_form_new`.
/// - Returns a newly allocated string that must be freed with `restwise_free_string`.
/// - Returns NULL on error; call `restwise_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn restwise_form_increment_coffee(
    form: *mut RestwiseFormHandle,
) -> *mut c_char {
    clear_last_error();

    if form.is_null() {
        set_last_error("Null form pointer");
        return ptr::null_mut();
    }

    let handle = &mut *form;
    let result = handle.form.increment_coffee();
    handle.report(result)
}

/// Step the form's coffee intake down by one cup and return a fresh report JSON.
///
/// # Safety
/// - `form` must be a valid pointer returned by `restwise_form_new`.
/// - Returns a newly allocated string that must be freed with `restwise_free_string`.
/// - Returns NULL on error; call `restwise_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn restwise_form_decrement_coffee(
    form: *mut RestwiseFormHandle,
) -> *mut c_char {
    clear_last_error();

    if form.is_null() {
        set_last_error("Null form pointer");
        return ptr::null_mut();
    }

    let handle = &mut *form;
    let result = handle.form.decrement_coffee();
    handle.report(result)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Restwise functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Restwise function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn restwise_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Restwise function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn restwise_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Restwise library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn restwise_version() -> *const c_char {
    // Use a static CString to avoid allocation
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
