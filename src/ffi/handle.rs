// Copyright 2024-2026 blas-workspace Contributors
// SPDX-License-Identifier: Apache-2.0

//! Handle creation and destruction.

use std::sync::Arc;

use super::error::{fail, guard, set_last_error, BlasWsStatus};
use crate::config::WorkspaceConfig;
use crate::device::{MockDeviceAllocator, SIMULATED_DEVICE_CAPACITY};
use crate::workspace::WorkspaceHandle;

/// Opaque handle passed across the C boundary.
pub struct BlasWsHandle {
    inner: WorkspaceHandle,
}

impl BlasWsHandle {
    /// Box a Rust-side handle for use with the C entry points.
    ///
    /// The pointer must be released with [`blasws_destroy_handle`].
    pub fn into_raw(inner: WorkspaceHandle) -> *mut BlasWsHandle {
        Box::into_raw(Box::new(BlasWsHandle { inner }))
    }

    /// Borrow the handle behind `ptr`, recording an error if it is null.
    ///
    /// # Safety
    /// `ptr` must be null or a live pointer from [`BlasWsHandle::into_raw`]
    /// or `blasws_create_handle`, not aliased for the returned lifetime.
    pub(crate) unsafe fn from_ptr<'a>(
        ptr: *mut BlasWsHandle,
    ) -> Result<&'a mut WorkspaceHandle, BlasWsStatus> {
        if ptr.is_null() {
            set_last_error("null handle");
            return Err(BlasWsStatus::InvalidHandle);
        }
        Ok(&mut (*ptr).inner)
    }
}

/// Create a handle bound to the active device, with its initial arena
/// allocated.
///
/// Configuration is read from the environment.
///
/// # Safety
/// `out_handle` must be null or valid for a pointer write.
#[no_mangle]
pub unsafe extern "C" fn blasws_create_handle(out_handle: *mut *mut BlasWsHandle) -> BlasWsStatus {
    guard(BlasWsStatus::InternalError, || {
        if out_handle.is_null() {
            set_last_error("null out_handle");
            return BlasWsStatus::InvalidPointer;
        }
        let config = WorkspaceConfig::from_env();
        let allocator = Arc::new(MockDeviceAllocator::new(SIMULATED_DEVICE_CAPACITY, 0));
        match WorkspaceHandle::new(&config, allocator) {
            Ok(handle) => {
                *out_handle = BlasWsHandle::into_raw(handle);
                BlasWsStatus::Success
            }
            Err(e) => fail(&e),
        }
    })
}

/// Destroy a handle and free its arena.
///
/// Aborts the process if the arena is still checked out or the device free
/// fails.
///
/// # Safety
/// `handle` must be null or a live handle; it is invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn blasws_destroy_handle(handle: *mut BlasWsHandle) -> BlasWsStatus {
    guard(BlasWsStatus::InternalError, || {
        if handle.is_null() {
            set_last_error("null handle");
            return BlasWsStatus::InvalidHandle;
        }
        drop(Box::from_raw(handle));
        BlasWsStatus::Success
    })
}
