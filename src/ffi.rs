//! FFI bindings for the solutions matrix
//!
//! This module provides C-compatible functions so a rendering shell written in
//! another language can drive the core. All functions use C strings
//! (null-terminated) and return allocated memory that must be freed by the
//! caller using `matrix_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::MatrixConfig;
use crate::error::MatrixError;
use crate::interaction::{CellEvent, DeviceMode, TooltipState, Transition};
use crate::pipeline::{csv_to_matrix_json, rows_json_to_render_json};
use crate::sources::{JsonRowSource, RowSource};
use crate::store::{LoadOutcome, LoadTicket, MatrixStore};

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

/// Read an optional JSON configuration; NULL means the default configuration
unsafe fn config_from_ptr(config_json: *const c_char) -> Result<MatrixConfig, MatrixError> {
    if config_json.is_null() {
        return Ok(MatrixConfig::default());
    }
    match cstr_to_string(config_json) {
        Some(json) => MatrixConfig::from_json(&json),
        None => Err(MatrixError::InvalidConfig(
            "configuration is not valid UTF-8".to_string(),
        )),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Build the matrix output model from CSV text.
///
/// # Safety
/// - `csv` must be a valid null-terminated C string.
/// - `config_json` must be a valid null-terminated C string or NULL for defaults.
/// - Returns a newly allocated string that must be freed with `matrix_free_string`.
/// - Returns NULL on error; call `matrix_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn matrix_csv_to_json(
    csv: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let csv_str = match cstr_to_string(csv) {
        Some(s) => s,
        None => {
            set_last_error("Invalid CSV string pointer");
            return ptr::null_mut();
        }
    };

    let result = config_from_ptr(config_json).and_then(|config| csv_to_matrix_json(csv_str, &config));

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Build the render model from a JSON array of rows.
///
/// # Safety
/// - `rows_json` must be a valid null-terminated C string.
/// - `config_json` must be a valid null-terminated C string or NULL for defaults.
/// - Returns a newly allocated string that must be freed with `matrix_free_string`.
/// - Returns NULL on error; call `matrix_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn matrix_rows_to_render_json(
    rows_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let rows_str = match cstr_to_string(rows_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid rows JSON string pointer");
            return ptr::null_mut();
        }
    };

    let result =
        config_from_ptr(config_json).and_then(|config| rows_json_to_render_json(rows_str, &config));

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Store API
// ============================================================================

/// Opaque handle to a MatrixStore
pub struct MatrixStoreHandle {
    store: MatrixStore,
}

/// Create a store. `touch_capable` non-zero selects touch interaction rules.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string or NULL for defaults.
/// - Returns a pointer that must be freed with `matrix_store_free`.
/// - Returns NULL on error; call `matrix_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn matrix_store_new(
    touch_capable: i32,
    config_json: *const c_char,
) -> *mut MatrixStoreHandle {
    clear_last_error();

    let config = match config_from_ptr(config_json) {
        Ok(config) => config,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let mode = if touch_capable != 0 {
        DeviceMode::Touch
    } else {
        DeviceMode::Pointer
    };

    let handle = Box::new(MatrixStoreHandle {
        store: MatrixStore::new(config, mode),
    });
    Box::into_raw(handle)
}

/// Free a store.
///
/// # Safety
/// - `store` must be a valid pointer returned by `matrix_store_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn matrix_store_free(store: *mut MatrixStoreHandle) {
    if !store.is_null() {
        drop(Box::from_raw(store));
    }
}

/// Start a load and return its generation (0 on error).
///
/// # Safety
/// - `store` must be a valid pointer returned by `matrix_store_new`.
#[no_mangle]
pub unsafe extern "C" fn matrix_store_begin_load(store: *mut MatrixStoreHandle) -> u64 {
    clear_last_error();

    if store.is_null() {
        set_last_error("Null store pointer");
        return 0;
    }

    let handle = &mut *store;
    handle.store.begin_load().generation()
}

/// Complete a load with a JSON array of rows, or with a failure message when
/// `rows_json` is NULL.
///
/// # Safety
/// - `store` must be a valid pointer returned by `matrix_store_new`.
/// - `rows_json` and `failure` must be valid null-terminated C strings or NULL.
/// - Returns 1 when applied, 0 when superseded by a newer load, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn matrix_store_complete(
    store: *mut MatrixStoreHandle,
    generation: u64,
    rows_json: *const c_char,
    failure: *const c_char,
) -> i32 {
    clear_last_error();

    if store.is_null() {
        set_last_error("Null store pointer");
        return -1;
    }

    let handle = &mut *store;

    let rows = match cstr_to_string(rows_json) {
        Some(json) => JsonRowSource::new(json).fetch(),
        None => Err(MatrixError::LoadFailure(
            cstr_to_string(failure).unwrap_or_else(|| "Failed to load dataset".to_string()),
        )),
    };

    match handle
        .store
        .complete(LoadTicket::from_generation(generation), rows)
    {
        LoadOutcome::Applied => 1,
        LoadOutcome::Superseded => 0,
    }
}

/// Current output model as JSON.
///
/// # Safety
/// - `store` must be a valid pointer returned by `matrix_store_new`.
/// - Returns a newly allocated string that must be freed with `matrix_free_string`.
/// - Returns NULL on error; call `matrix_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn matrix_store_view_json(store: *mut MatrixStoreHandle) -> *mut c_char {
    clear_last_error();

    if store.is_null() {
        set_last_error("Null store pointer");
        return ptr::null_mut();
    }

    let handle = &*store;

    match serde_json::to_string(&handle.store.view()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

#[derive(serde::Serialize)]
struct EventResult<'a> {
    transition: Transition,
    tooltip: &'a TooltipState,
}

/// Apply a rendering event (JSON) and return the transition and tooltip state.
///
/// # Safety
/// - `store` must be a valid pointer returned by `matrix_store_new`.
/// - `event_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `matrix_free_string`.
/// - Returns NULL on error; call `matrix_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn matrix_store_handle_event(
    store: *mut MatrixStoreHandle,
    event_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if store.is_null() {
        set_last_error("Null store pointer");
        return ptr::null_mut();
    }

    let handle = &mut *store;

    let event: CellEvent = match cstr_to_string(event_json).map(|s| serde_json::from_str(&s)) {
        Some(Ok(event)) => event,
        Some(Err(e)) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
        None => {
            set_last_error("Invalid event JSON string pointer");
            return ptr::null_mut();
        }
    };

    let transition = handle.store.handle_event(&event);
    let result = EventResult {
        transition,
        tooltip: handle.store.resolver().state(),
    };

    match serde_json::to_string(&result) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by matrix functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a matrix function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn matrix_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next matrix function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn matrix_last_error() -> *const c_char {
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
pub unsafe extern "C" fn matrix_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
