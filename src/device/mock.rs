// Copyright 2024-2026 blas-workspace Contributors
// Licensed under the Apache License, Version 2.0

//! Simulated device allocator (testing + host-only builds).

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{DeviceAllocation, DeviceAllocator, DeviceError};

const BASE_ADDR: u64 = 0x7f00_0000_0000;
const ADDR_ALIGN: u64 = 256;

struct MockState {
    allocations: HashMap<u64, usize>,
    total: usize,
    next_addr: u64,
    fail_allocation: Option<DeviceError>,
    fail_deallocation: Option<DeviceError>,
    fail_device_query: Option<DeviceError>,
}

/// Simulated device with a fixed byte capacity.
///
/// Addresses are unique for the allocator's lifetime and never reused, so a
/// stale address is always reported as a double free.
pub struct MockDeviceAllocator {
    capacity: usize,
    device_index: usize,
    state: Mutex<MockState>,
}

impl MockDeviceAllocator {
    pub fn new(capacity: usize, device_index: usize) -> Self {
        Self {
            capacity,
            device_index,
            state: Mutex::new(MockState {
                allocations: HashMap::new(),
                total: 0,
                next_addr: BASE_ADDR,
                fail_allocation: None,
                fail_deallocation: None,
                fail_device_query: None,
            }),
        }
    }

    /// Count of live (un-freed) allocations, for leak detection.
    pub fn leak_count(&self) -> usize {
        self.state.lock().allocations.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Make the next `allocate` call fail with `error`.
    pub fn fail_next_allocation(&self, error: DeviceError) {
        self.state.lock().fail_allocation = Some(error);
    }

    /// Make the next `deallocate` call fail with `error`. The allocation is
    /// still released on the simulated device.
    pub fn fail_next_deallocation(&self, error: DeviceError) {
        self.state.lock().fail_deallocation = Some(error);
    }

    /// Make the next `current_device` call fail with `error`.
    pub fn fail_device_query(&self, error: DeviceError) {
        self.state.lock().fail_device_query = Some(error);
    }
}

impl DeviceAllocator for MockDeviceAllocator {
    fn current_device(&self) -> Result<usize, DeviceError> {
        match self.state.lock().fail_device_query.take() {
            Some(e) => Err(e),
            None => Ok(self.device_index),
        }
    }

    fn allocate(&self, size: usize) -> Result<DeviceAllocation, DeviceError> {
        let mut s = self.state.lock();
        if let Some(e) = s.fail_allocation.take() {
            return Err(e);
        }
        if size == 0 {
            return Err(DeviceError::InvalidValue("zero-byte allocation".into()));
        }
        if s.total.saturating_add(size) > self.capacity {
            return Err(DeviceError::OutOfMemory {
                required: size as u64,
                available: (self.capacity - s.total) as u64,
            });
        }
        let addr = s.next_addr;
        let span = (size as u64 + ADDR_ALIGN - 1) / ADDR_ALIGN * ADDR_ALIGN;
        s.next_addr += span;
        s.allocations.insert(addr, size);
        s.total += size;
        Ok(DeviceAllocation { addr, size, device_index: self.device_index })
    }

    fn deallocate(&self, allocation: &DeviceAllocation) -> Result<(), DeviceError> {
        let mut s = self.state.lock();
        let injected = s.fail_deallocation.take();
        match s.allocations.remove(&allocation.addr) {
            Some(size) => {
                s.total -= size;
                injected.map_or(Ok(()), Err)
            }
            None => Err(DeviceError::InvalidDevicePointer(allocation.addr)),
        }
    }

    fn allocated_bytes(&self) -> usize {
        self.state.lock().total
    }
}
