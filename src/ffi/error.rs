// Copyright 2024-2026 blas-workspace Contributors
// SPDX-License-Identifier: Apache-2.0

//! C status codes, the thread-local last-error slot and the panic guard.

use std::any::Any;
use std::cell::RefCell;
use std::ffi::{c_char, CStr, CString};
use std::panic::{self, AssertUnwindSafe};

use crate::device::DeviceError;
use crate::workspace::{SizeQueryOutcome, WorkspaceError};

/// Status returned by every status-returning entry point.
///
/// Non-negative values are successes; errors are negative. Values are
/// ABI-stable.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlasWsStatus {
    Success = 0,
    /// `request_device_memory_size` raised the query maximum.
    SizeIncreased = 1,
    /// `request_device_memory_size` left the query maximum unchanged.
    SizeUnchanged = 2,
    InvalidHandle = -1,
    InvalidPointer = -2,
    /// Internal failure, including use of an arena that is checked out.
    InternalError = -3,
    /// Query start/stop called in the wrong state.
    SizeQueryMismatch = -4,
    MemoryError = -5,
    InvalidValue = -6,
    DriverError = -7,
}

impl BlasWsStatus {
    /// Status for a raw code received from C.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => BlasWsStatus::Success,
            1 => BlasWsStatus::SizeIncreased,
            2 => BlasWsStatus::SizeUnchanged,
            -1 => BlasWsStatus::InvalidHandle,
            -2 => BlasWsStatus::InvalidPointer,
            -3 => BlasWsStatus::InternalError,
            -4 => BlasWsStatus::SizeQueryMismatch,
            -5 => BlasWsStatus::MemoryError,
            -6 => BlasWsStatus::InvalidValue,
            -7 => BlasWsStatus::DriverError,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        self.as_cstr().to_str().unwrap_or("unknown status")
    }

    fn as_cstr(self) -> &'static CStr {
        match self {
            BlasWsStatus::Success => c"success",
            BlasWsStatus::SizeIncreased => c"size increased",
            BlasWsStatus::SizeUnchanged => c"size unchanged",
            BlasWsStatus::InvalidHandle => c"invalid handle",
            BlasWsStatus::InvalidPointer => c"invalid pointer",
            BlasWsStatus::InternalError => c"internal error",
            BlasWsStatus::SizeQueryMismatch => c"size query mismatch",
            BlasWsStatus::MemoryError => c"memory error",
            BlasWsStatus::InvalidValue => c"invalid value",
            BlasWsStatus::DriverError => c"driver error",
        }
    }
}

impl From<&DeviceError> for BlasWsStatus {
    fn from(e: &DeviceError) -> Self {
        match e {
            DeviceError::OutOfMemory { .. } => BlasWsStatus::MemoryError,
            _ => BlasWsStatus::DriverError,
        }
    }
}

impl From<&WorkspaceError> for BlasWsStatus {
    fn from(e: &WorkspaceError) -> Self {
        match e {
            WorkspaceError::SizeQueryMismatch(_) => BlasWsStatus::SizeQueryMismatch,
            WorkspaceError::ArenaInUse => BlasWsStatus::InternalError,
            WorkspaceError::InsufficientArena { .. } => BlasWsStatus::MemoryError,
            WorkspaceError::InvalidValue(_) => BlasWsStatus::InvalidValue,
            WorkspaceError::KernelFailed { .. } => BlasWsStatus::InternalError,
            WorkspaceError::Device(d) => d.into(),
        }
    }
}

impl From<SizeQueryOutcome> for BlasWsStatus {
    fn from(outcome: SizeQueryOutcome) -> Self {
        match outcome {
            SizeQueryOutcome::Increased => BlasWsStatus::SizeIncreased,
            SizeQueryOutcome::Unchanged => BlasWsStatus::SizeUnchanged,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

pub(crate) fn set_last_error(msg: impl Into<String>) {
    let msg = msg.into().replace('\0', " ");
    let cstr = CString::new(msg).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(cstr));
}

/// Record `e` as the last error and translate it.
pub(crate) fn fail(e: &WorkspaceError) -> BlasWsStatus {
    set_last_error(e.to_string());
    e.into()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `body`, turning an escaped panic into `fallback`.
pub(crate) fn guard<T>(fallback: T, body: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            tracing::error!(panic = %msg, "panic caught at C boundary");
            set_last_error(format!("panic: {msg}"));
            fallback
        }
    }
}

/// Message of the last failed call on this thread, or null.
///
/// The pointer stays valid until the next failing call on the same thread
/// or `blasws_clear_last_error`.
#[no_mangle]
pub extern "C" fn blasws_get_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |s| s.as_ptr())
    })
}

#[no_mangle]
pub extern "C" fn blasws_clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Static description of a status code. Never null, never freed by the caller.
#[no_mangle]
pub extern "C" fn blasws_status_to_string(status: i32) -> *const c_char {
    BlasWsStatus::from_code(status)
        .map_or(c"unknown status", BlasWsStatus::as_cstr)
        .as_ptr()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_values() {
        assert_eq!(BlasWsStatus::Success as i32, 0);
        assert_eq!(BlasWsStatus::SizeIncreased as i32, 1);
        assert_eq!(BlasWsStatus::SizeUnchanged as i32, 2);
        assert_eq!(BlasWsStatus::InvalidHandle as i32, -1);
        assert_eq!(BlasWsStatus::InvalidPointer as i32, -2);
        assert_eq!(BlasWsStatus::InternalError as i32, -3);
        assert_eq!(BlasWsStatus::SizeQueryMismatch as i32, -4);
        assert_eq!(BlasWsStatus::MemoryError as i32, -5);
        assert_eq!(BlasWsStatus::InvalidValue as i32, -6);
        assert_eq!(BlasWsStatus::DriverError as i32, -7);
    }

    #[test]
    fn test_error_translation() {
        let oom = WorkspaceError::Device(DeviceError::OutOfMemory { required: 2, available: 1 });
        assert_eq!(BlasWsStatus::from(&oom), BlasWsStatus::MemoryError);
        let driver = WorkspaceError::Device(DeviceError::Driver { code: 700, message: "x".into() });
        assert_eq!(BlasWsStatus::from(&driver), BlasWsStatus::DriverError);
        assert_eq!(
            BlasWsStatus::from(&WorkspaceError::Device(DeviceError::NoDevice)),
            BlasWsStatus::DriverError
        );
        assert_eq!(BlasWsStatus::from(&WorkspaceError::ArenaInUse), BlasWsStatus::InternalError);
        assert_eq!(
            BlasWsStatus::from(&WorkspaceError::InsufficientArena { requested: 2, available: 1 }),
            BlasWsStatus::MemoryError
        );
        assert_eq!(
            BlasWsStatus::from(&WorkspaceError::InvalidValue("x".into())),
            BlasWsStatus::InvalidValue
        );
        assert_eq!(
            BlasWsStatus::from(&WorkspaceError::SizeQueryMismatch("x")),
            BlasWsStatus::SizeQueryMismatch
        );
    }

    #[test]
    fn test_last_error_roundtrip() {
        blasws_clear_last_error();
        assert!(blasws_get_last_error().is_null());
        set_last_error("arena busy");
        let msg = unsafe { CStr::from_ptr(blasws_get_last_error()) };
        assert_eq!(msg.to_str().unwrap(), "arena busy");
        blasws_clear_last_error();
        assert!(blasws_get_last_error().is_null());
    }

    #[test]
    fn test_interior_nul_is_replaced() {
        set_last_error("a\0b");
        let msg = unsafe { CStr::from_ptr(blasws_get_last_error()) };
        assert_eq!(msg.to_str().unwrap(), "a b");
    }

    #[test]
    fn test_guard_catches_panic() {
        blasws_clear_last_error();
        let status = guard(BlasWsStatus::InternalError, || -> BlasWsStatus {
            panic!("boom");
        });
        assert_eq!(status, BlasWsStatus::InternalError);
        let msg = unsafe { CStr::from_ptr(blasws_get_last_error()) };
        assert!(msg.to_str().unwrap().contains("boom"));
    }

    #[test]
    fn test_status_strings() {
        let s = unsafe { CStr::from_ptr(blasws_status_to_string(BlasWsStatus::MemoryError as i32)) };
        assert_eq!(s.to_str().unwrap(), "memory error");
        let s = unsafe { CStr::from_ptr(blasws_status_to_string(42)) };
        assert_eq!(s.to_str().unwrap(), "unknown status");
        for code in -7..=2 {
            assert_eq!(BlasWsStatus::from_code(code).map(|s| s as i32), Some(code));
        }
        assert_eq!(BlasWsStatus::from_code(-8), None);
        assert_eq!(BlasWsStatus::SizeQueryMismatch.as_str(), "size query mismatch");
    }
}
