//! FFI bindings for the gesture estimator
//!
//! This module provides C-compatible functions for embedding the pipeline
//! in a host mobile app. Per-sample calls use plain floats and out-arrays
//! so the delivery callback never allocates; configuration and diagnostics
//! travel as JSON strings that must be freed with `acm_free_string`.

use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use crate::config::PipelineConfig;
use crate::pipeline::GesturePipeline;
use crate::types::{MotionState, Sample, Vec3};

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

/// Helper to convert a Rust string to a C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn write_vec3(out: *mut f32, v: Vec3) {
    unsafe {
        *out.add(0) = v.x();
        *out.add(1) = v.y();
        *out.add(2) = v.z();
    }
}

/// Opaque handle to a GesturePipeline
pub struct AcmPipelineHandle {
    pipeline: GesturePipeline,
}

/// Create a new pipeline from explicit tunables.
///
/// # Safety
/// - Returns a pointer to a newly allocated pipeline.
/// - Must be freed with `acm_pipeline_free`.
/// - Returns NULL if the configuration is invalid; call `acm_last_error`
///   to get the error message.
#[no_mangle]
pub unsafe extern "C" fn acm_pipeline_new(
    alpha: f32,
    hard_threshold: f32,
    soft_threshold: f32,
    motion_threshold: f32,
    history_majority: u32,
) -> *mut AcmPipelineHandle {
    clear_last_error();

    let config = PipelineConfig {
        alpha,
        hard_threshold,
        soft_threshold,
        motion_threshold,
        history_majority: history_majority as usize,
    };

    match GesturePipeline::new(config) {
        Ok(pipeline) => Box::into_raw(Box::new(AcmPipelineHandle { pipeline })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Create a new pipeline with the default configuration.
///
/// # Safety
/// - Returns a pointer to a newly allocated pipeline.
/// - Must be freed with `acm_pipeline_free`.
#[no_mangle]
pub unsafe extern "C" fn acm_pipeline_new_default() -> *mut AcmPipelineHandle {
    clear_last_error();
    let pipeline = GesturePipeline::with_defaults();
    Box::into_raw(Box::new(AcmPipelineHandle { pipeline }))
}

/// Free a pipeline.
///
/// # Safety
/// - `pipeline` must be a valid pointer returned by `acm_pipeline_new` or
///   `acm_pipeline_new_default`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn acm_pipeline_free(pipeline: *mut AcmPipelineHandle) {
    if !pipeline.is_null() {
        drop(Box::from_raw(pipeline));
    }
}

/// Process one acceleration sample and write the position delta.
///
/// # Safety
/// - `pipeline` must be a valid pointer returned by `acm_pipeline_new`.
/// - `out_delta` must point to at least 3 writable floats.
/// - Returns the motion state after the sample (0 = still, 1 = moving), or
///   -1 on a null pointer.
#[no_mangle]
pub unsafe extern "C" fn acm_pipeline_process(
    pipeline: *mut AcmPipelineHandle,
    timestamp_s: f64,
    accel_x: f32,
    accel_y: f32,
    accel_z: f32,
    out_delta: *mut f32,
) -> i32 {
    clear_last_error();

    if pipeline.is_null() {
        set_last_error("Null pipeline pointer");
        return -1;
    }
    if out_delta.is_null() {
        set_last_error("Null out_delta pointer");
        return -1;
    }

    let handle = &mut *pipeline;
    let sample = Sample::new(timestamp_s, Vec3::new(accel_x, accel_y, accel_z));
    let update = handle.pipeline.process(&sample);
    write_vec3(out_delta, update.position_delta);

    match update.motion_state {
        MotionState::Still => 0,
        MotionState::Moving => 1,
    }
}

/// Read the absolute position snapshot.
///
/// # Safety
/// - `pipeline` must be a valid pointer returned by `acm_pipeline_new`.
/// - `out_position` must point to at least 3 writable floats.
/// - Returns 0 on success, non-zero on a null pointer.
#[no_mangle]
pub unsafe extern "C" fn acm_pipeline_position(
    pipeline: *const AcmPipelineHandle,
    out_position: *mut f32,
) -> i32 {
    clear_last_error();

    if pipeline.is_null() || out_position.is_null() {
        set_last_error("Null pointer");
        return -1;
    }

    let handle = &*pipeline;
    write_vec3(out_position, handle.pipeline.position());
    0
}

/// Zero the kinematic and filter state (explicit reset gesture).
///
/// # Safety
/// - `pipeline` must be a valid pointer returned by `acm_pipeline_new`.
#[no_mangle]
pub unsafe extern "C" fn acm_pipeline_reset(pipeline: *mut AcmPipelineHandle) {
    clear_last_error();

    if pipeline.is_null() {
        set_last_error("Null pipeline pointer");
        return;
    }

    (*pipeline).pipeline.reset();
}

/// Get the diagnostic counters as JSON.
///
/// # Safety
/// - `pipeline` must be a valid pointer returned by `acm_pipeline_new`.
/// - Returns a newly allocated string that must be freed with
///   `acm_free_string`.
/// - Returns NULL on error; call `acm_last_error` to get the message.
#[no_mangle]
pub unsafe extern "C" fn acm_pipeline_diagnostics_json(
    pipeline: *const AcmPipelineHandle,
) -> *mut c_char {
    clear_last_error();

    if pipeline.is_null() {
        set_last_error("Null pipeline pointer");
        return ptr::null_mut();
    }

    let diagnostics = (*pipeline).pipeline.diagnostics();
    match serde_json::to_string(&diagnostics) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a string returned by this library.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a library function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn acm_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next library call on this
///   thread. Do NOT free it.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn acm_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn acm_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
