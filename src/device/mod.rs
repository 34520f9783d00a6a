// Copyright 2024-2026 blas-workspace Contributors
// Licensed under the Apache License, Version 2.0

//! Device capability seam.
//!
//! The accelerator driver's allocate/free primitive is modelled as the
//! [`DeviceAllocator`] trait. A handle binds to the device that is active
//! when it is created and allocates its arena exclusively through it.

mod mock;

use thiserror::Error;

pub use mock::MockDeviceAllocator;

/// Capacity of the simulated device used by the C entry points and the CLI.
pub const SIMULATED_DEVICE_CAPACITY: usize = 1 << 30;

/// A single device-memory allocation.
///
/// `addr` is an opaque device address; it is never dereferenced on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAllocation {
    pub addr: u64,
    pub size: usize,
    pub device_index: usize,
}

/// Driver-level failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("No accelerator device available")]
    NoDevice,

    #[error("Out of device memory: required {required} bytes, available {available} bytes")]
    OutOfMemory { required: u64, available: u64 },

    #[error("Invalid device pointer: {0:#x}")]
    InvalidDevicePointer(u64),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Driver error {code}: {message}")]
    Driver { code: i32, message: String },
}

impl DeviceError {
    /// Numeric driver code, stable across releases.
    pub fn code(&self) -> i32 {
        match self {
            Self::NoDevice => 100,
            Self::OutOfMemory { .. } => 2,
            Self::InvalidDevicePointer(_) => 17,
            Self::InvalidValue(_) => 1,
            Self::Driver { code, .. } => *code,
        }
    }
}

/// Trait abstracting the driver's allocation primitives for one device.
pub trait DeviceAllocator: Send + Sync {
    /// Index of the device currently active for the calling context.
    fn current_device(&self) -> Result<usize, DeviceError>;
    fn allocate(&self, size: usize) -> Result<DeviceAllocation, DeviceError>;
    fn deallocate(&self, allocation: &DeviceAllocation) -> Result<(), DeviceError>;
    fn allocated_bytes(&self) -> usize;
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
