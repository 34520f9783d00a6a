// Copyright 2024-2026 blas-workspace Contributors
// SPDX-License-Identifier: Apache-2.0

//! Device memory size queries and resizing.

use super::error::{fail, guard, set_last_error, BlasWsStatus};
use super::handle::BlasWsHandle;

/// Open a size-query window.
///
/// # Safety
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn blasws_start_device_memory_size_query(
    handle: *mut BlasWsHandle,
) -> BlasWsStatus {
    guard(BlasWsStatus::InternalError, || {
        let h = match BlasWsHandle::from_ptr(handle) {
            Ok(h) => h,
            Err(status) => return status,
        };
        match h.start_device_memory_size_query() {
            Ok(()) => BlasWsStatus::Success,
            Err(e) => fail(&e),
        }
    })
}

/// Close the size-query window and write the maximum requested size.
///
/// The query state is checked before `out_size`; a null `out_size` after a
/// successful check leaves the window open.
///
/// # Safety
/// `handle` must be null or a live handle; `out_size` must be null or
/// valid for a write.
#[no_mangle]
pub unsafe extern "C" fn blasws_stop_device_memory_size_query(
    handle: *mut BlasWsHandle,
    out_size: *mut usize,
) -> BlasWsStatus {
    guard(BlasWsStatus::InternalError, || {
        let h = match BlasWsHandle::from_ptr(handle) {
            Ok(h) => h,
            Err(status) => return status,
        };
        if !h.is_device_memory_size_query() {
            set_last_error("size query is not active");
            return BlasWsStatus::SizeQueryMismatch;
        }
        if out_size.is_null() {
            set_last_error("null out_size");
            return BlasWsStatus::InvalidPointer;
        }
        match h.stop_device_memory_size_query() {
            Ok(size) => {
                *out_size = size;
                BlasWsStatus::Success
            }
            Err(e) => fail(&e),
        }
    })
}

/// Write the current arena size in bytes.
///
/// # Safety
/// `handle` must be null or a live handle; `out_size` must be null or
/// valid for a write.
#[no_mangle]
pub unsafe extern "C" fn blasws_get_device_memory_size(
    handle: *mut BlasWsHandle,
    out_size: *mut usize,
) -> BlasWsStatus {
    guard(BlasWsStatus::InternalError, || {
        let h = match BlasWsHandle::from_ptr(handle) {
            Ok(h) => h,
            Err(status) => return status,
        };
        if out_size.is_null() {
            set_last_error("null out_size");
            return BlasWsStatus::InvalidPointer;
        }
        *out_size = h.get_device_memory_size();
        BlasWsStatus::Success
    })
}

/// Replace the arena with one of at least `requested` bytes.
///
/// # Safety
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn blasws_set_device_memory_size(
    handle: *mut BlasWsHandle,
    requested: usize,
) -> BlasWsStatus {
    guard(BlasWsStatus::InternalError, || {
        let h = match BlasWsHandle::from_ptr(handle) {
            Ok(h) => h,
            Err(status) => return status,
        };
        match h.set_device_memory_size(requested) {
            Ok(()) => BlasWsStatus::Success,
            Err(e) => fail(&e),
        }
    })
}

/// Record a kernel variant's workspace requirement during a query window.
///
/// # Safety
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn blasws_request_device_memory_size(
    handle: *mut BlasWsHandle,
    candidate: usize,
) -> BlasWsStatus {
    guard(BlasWsStatus::InternalError, || {
        let h = match BlasWsHandle::from_ptr(handle) {
            Ok(h) => h,
            Err(status) => return status,
        };
        match h.request_device_memory_size(candidate) {
            Ok(outcome) => outcome.into(),
            Err(e) => fail(&e),
        }
    })
}

/// Always false: the library never grows the arena on its own.
///
/// # Safety
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn blasws_is_managing_device_memory(handle: *mut BlasWsHandle) -> bool {
    guard(false, || {
        BlasWsHandle::from_ptr(handle).map_or(false, |h| h.is_managing_device_memory())
    })
}

/// True while a size-query window is open. False for a null handle.
///
/// # Safety
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn blasws_is_device_memory_size_query(handle: *mut BlasWsHandle) -> bool {
    guard(false, || {
        BlasWsHandle::from_ptr(handle).map_or(false, |h| h.is_device_memory_size_query())
    })
}
