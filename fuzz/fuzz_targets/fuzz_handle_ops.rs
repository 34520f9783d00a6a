//! Fuzz target for arbitrary handle operation sequences.
//!
//! Checks the arena invariants after every step: the size is a multiple of
//! the chunk size, a failed resize never leaks, and the device holds exactly
//! the handle's arena.

#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use blas_workspace::config::WorkspaceConfig;
use blas_workspace::device::{DeviceAllocator, DeviceError, MockDeviceAllocator};
use blas_workspace::workspace::{WorkspaceHandle, MIN_CHUNK_SIZE};

const CAPACITY: usize = 64 << 20;

#[derive(Debug, Arbitrary)]
enum Op {
    Start,
    Request(u32),
    Stop,
    SetSize(u32),
    Checkout(u32),
    FailNextAlloc,
}

fuzz_target!(|ops: Vec<Op>| {
    let alloc = Arc::new(MockDeviceAllocator::new(CAPACITY, 0));
    let Ok(mut handle) = WorkspaceHandle::new(&WorkspaceConfig::default(), alloc.clone()) else {
        return;
    };

    for op in ops {
        match op {
            Op::Start => {
                let _ = handle.start_device_memory_size_query();
            }
            Op::Request(n) => {
                let _ = handle.request_device_memory_size(n as usize);
            }
            Op::Stop => {
                let _ = handle.stop_device_memory_size_query();
            }
            Op::SetSize(n) => {
                let _ = handle.set_device_memory_size(n as usize);
            }
            Op::Checkout(n) => {
                if let Ok(checkout) = handle.checkout(n as usize) {
                    assert!(handle.is_device_memory_in_use());
                    assert!(checkout.size() <= handle.get_device_memory_size());
                }
                assert!(!handle.is_device_memory_in_use());
            }
            Op::FailNextAlloc => {
                alloc.fail_next_allocation(DeviceError::OutOfMemory { required: 0, available: 0 });
            }
        }

        let size = handle.get_device_memory_size();
        assert_eq!(size % MIN_CHUNK_SIZE, 0);
        assert_eq!(alloc.allocated_bytes(), size);
        assert!(!handle.is_managing_device_memory());
    }

    drop(handle);
    assert_eq!(alloc.allocated_bytes(), 0);
});
