//! C FFI bindings for sheetcat-core
//!
//! Provides a C-compatible API so a host GUI can run a merge off its event
//! loop and poll the structured result. The merge runs synchronously inside
//! the call; the returned handle is immutable.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::ptr;

/// Opaque handle to a completed merge run
pub struct FfiMergeResult {
    inner: sheetcat_core::MergeResult,
}

/// Merge the tabular files in a directory.
///
/// `header_row` is 0-based, matching the core contract.
///
/// # Safety
/// - `dir` must be a valid C string
/// - Returns null on error (including the no-baseline case)
#[no_mangle]
pub unsafe extern "C" fn sheetcat_merge_directory(
    dir: *const c_char,
    header_row: usize,
) -> *mut FfiMergeResult {
    if dir.is_null() {
        return ptr::null_mut();
    }

    let dir = match CStr::from_ptr(dir).to_str() {
        Ok(s) => PathBuf::from(s),
        Err(_) => return ptr::null_mut(),
    };

    match sheetcat_core::merge_directory(&dir, header_row) {
        Ok(result) => Box::into_raw(Box::new(FfiMergeResult { inner: result })),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a merge result
///
/// # Safety
/// - `result` must be a valid pointer returned by `sheetcat_merge_directory` or null
#[no_mangle]
pub unsafe extern "C" fn sheetcat_free_merge_result(result: *mut FfiMergeResult) {
    if !result.is_null() {
        drop(Box::from_raw(result));
    }
}

/// Get the row count of the compiled table
///
/// # Safety
/// - `result` must be a valid pointer returned by `sheetcat_merge_directory`
#[no_mangle]
pub unsafe extern "C" fn sheetcat_merge_row_count(result: *const FfiMergeResult) -> usize {
    if result.is_null() {
        return 0;
    }
    (*result).inner.row_count()
}

/// Get the column count of the compiled table
///
/// # Safety
/// - `result` must be a valid pointer returned by `sheetcat_merge_directory`
#[no_mangle]
pub unsafe extern "C" fn sheetcat_merge_col_count(result: *const FfiMergeResult) -> usize {
    if result.is_null() {
        return 0;
    }
    (*result).inner.table.column_count()
}

/// Get the number of per-file outcomes (one per discovered file)
///
/// # Safety
/// - `result` must be a valid pointer returned by `sheetcat_merge_directory`
#[no_mangle]
pub unsafe extern "C" fn sheetcat_merge_outcome_count(result: *const FfiMergeResult) -> usize {
    if result.is_null() {
        return 0;
    }
    (*result).inner.outcomes.len()
}

/// Get the number of files that contributed rows
///
/// # Safety
/// - `result` must be a valid pointer returned by `sheetcat_merge_directory`
#[no_mangle]
pub unsafe extern "C" fn sheetcat_merge_included_count(result: *const FfiMergeResult) -> usize {
    if result.is_null() {
        return 0;
    }
    (*result).inner.included_count()
}

/// Get a column name by index
///
/// # Safety
/// - `result` must be a valid pointer returned by `sheetcat_merge_directory`
/// - Returns null if index is out of bounds
/// - Caller must free the returned string with `sheetcat_free_string`
#[no_mangle]
pub unsafe extern "C" fn sheetcat_merge_col_name(
    result: *const FfiMergeResult,
    index: usize,
) -> *mut c_char {
    if result.is_null() {
        return ptr::null_mut();
    }

    (&(*result)
        .inner
        .table
        .columns)
        .get(index)
        .and_then(|c| CString::new(c.name.as_str()).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Get a cell value as a string
///
/// # Safety
/// - `result` must be a valid pointer returned by `sheetcat_merge_directory`
/// - Returns null if row or col is out of bounds
/// - Caller must free the returned string with `sheetcat_free_string`
#[no_mangle]
pub unsafe extern "C" fn sheetcat_merge_cell(
    result: *const FfiMergeResult,
    row: usize,
    col: usize,
) -> *mut c_char {
    if result.is_null() {
        return ptr::null_mut();
    }

    (&(*result)
        .inner
        .table
        .rows)
        .get(row)
        .and_then(|r| r.cells.get(col))
        .and_then(|c| CString::new(c.to_string_value()).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Get the full report (baseline, outcomes, counts) as a JSON string
///
/// # Safety
/// - `result` must be a valid pointer returned by `sheetcat_merge_directory`
/// - Caller must free the returned string with `sheetcat_free_string`
#[no_mangle]
pub unsafe extern "C" fn sheetcat_merge_report_json(
    result: *const FfiMergeResult,
) -> *mut c_char {
    if result.is_null() {
        return ptr::null_mut();
    }

    (*result)
        .inner
        .to_json()
        .ok()
        .and_then(|json| CString::new(json).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Write the compiled table to `dest` (.xlsx or .csv). Returns true on
/// success; refuses an empty result.
///
/// # Safety
/// - `result` must be a valid pointer returned by `sheetcat_merge_directory`
/// - `dest` must be a valid C string
#[no_mangle]
pub unsafe extern "C" fn sheetcat_merge_write(
    result: *const FfiMergeResult,
    dest: *const c_char,
) -> bool {
    if result.is_null() || dest.is_null() {
        return false;
    }

    let dest = match CStr::from_ptr(dest).to_str() {
        Ok(s) => Path::new(s),
        Err(_) => return false,
    };

    let merged = &(*result).inner;
    if merged.is_empty() {
        return false;
    }

    sheetcat_core::write_table(&merged.table, dest).is_ok()
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a sheetcat_* function or null
#[no_mangle]
pub unsafe extern "C" fn sheetcat_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
