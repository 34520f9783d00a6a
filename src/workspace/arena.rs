// Copyright 2024-2026 blas-workspace Contributors
// Licensed under the Apache License, Version 2.0

//! Arena store: the handle's single device buffer and its in-use flag.
//!
//! The size is derived from the buffer itself, so `size() == 0` exactly when
//! no buffer is held.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::device::{DeviceAllocation, DeviceAllocator, DeviceError};

use super::error::WorkspaceError;

/// Allocation granularity of the arena.
pub const MIN_CHUNK_SIZE: usize = 64 * 1024;

/// Arena size used when no override is configured.
pub const DEFAULT_DEVICE_MEMORY_SIZE: usize = 1024 * 1024;

/// Round `size` up to a multiple of [`MIN_CHUNK_SIZE`]. `None` on overflow.
pub fn roundup_device_memory_size(size: usize) -> Option<usize> {
    size.checked_add(MIN_CHUNK_SIZE - 1)
        .map(|n| n / MIN_CHUNK_SIZE * MIN_CHUNK_SIZE)
}

/// Current arena state.
#[derive(Debug, Default)]
pub struct ArenaStore {
    buffer: Option<DeviceAllocation>,
    in_use: Arc<AtomicBool>,
}

impl ArenaStore {
    pub fn size(&self) -> usize {
        self.buffer.as_ref().map_or(0, |b| b.size)
    }

    pub fn addr(&self) -> Option<u64> {
        self.buffer.as_ref().map(|b| b.addr)
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Ordering::Acquire)
    }

    pub(crate) fn in_use_flag(&self) -> &Arc<AtomicBool> {
        &self.in_use
    }

    /// Free the current buffer, if any. The store is empty afterwards even
    /// when the driver reports a failure.
    pub(crate) fn release(&mut self, allocator: &dyn DeviceAllocator) -> Result<(), DeviceError> {
        match self.buffer.take() {
            Some(buffer) => allocator.deallocate(&buffer),
            None => Ok(()),
        }
    }

    /// Replace the buffer with one of at least `requested` bytes, rounded.
    ///
    /// Returns the committed size. Fails without touching anything while the
    /// arena is checked out; any later failure leaves the store empty.
    pub(crate) fn replace(
        &mut self,
        allocator: &dyn DeviceAllocator,
        requested: usize,
    ) -> Result<usize, WorkspaceError> {
        if self.is_in_use() {
            return Err(WorkspaceError::ArenaInUse);
        }

        self.release(allocator)?;

        let rounded = roundup_device_memory_size(requested).ok_or_else(|| {
            WorkspaceError::InvalidValue(format!("device memory size {requested} overflows"))
        })?;
        if rounded == 0 {
            return Ok(0);
        }

        let buffer = allocator.allocate(rounded)?;
        debug_assert_eq!(buffer.size, rounded);
        self.buffer = Some(buffer);
        Ok(rounded)
    }
}
