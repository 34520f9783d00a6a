//! Tests for the device allocator trait and MockDeviceAllocator.

use super::{DeviceAllocator, DeviceError, MockDeviceAllocator};

#[test]
fn allocate_and_deallocate_all_returns_zero() {
    let alloc = MockDeviceAllocator::new(4096, 0);
    let mut handles = Vec::new();
    for _ in 0..8 {
        handles.push(alloc.allocate(512).unwrap());
    }
    assert_eq!(alloc.allocated_bytes(), 4096);
    for h in &handles {
        alloc.deallocate(h).unwrap();
    }
    assert_eq!(alloc.allocated_bytes(), 0);
    assert_eq!(alloc.leak_count(), 0);
}

#[test]
fn beyond_capacity_returns_out_of_memory() {
    let alloc = MockDeviceAllocator::new(1024, 0);
    let _a = alloc.allocate(512).unwrap();
    let result = alloc.allocate(1024);
    assert_eq!(
        result,
        Err(DeviceError::OutOfMemory { required: 1024, available: 512 })
    );
}

#[test]
fn double_free_detection() {
    let alloc = MockDeviceAllocator::new(4096, 0);
    let handle = alloc.allocate(256).unwrap();
    alloc.deallocate(&handle).unwrap();
    let result = alloc.deallocate(&handle);
    assert_eq!(result, Err(DeviceError::InvalidDevicePointer(handle.addr)));
}

#[test]
fn zero_byte_allocation_is_invalid() {
    let alloc = MockDeviceAllocator::new(4096, 0);
    assert!(matches!(alloc.allocate(0), Err(DeviceError::InvalidValue(_))));
}

#[test]
fn addresses_are_unique_aligned_and_nonzero() {
    let alloc = MockDeviceAllocator::new(1 << 20, 0);
    let a = alloc.allocate(1).unwrap();
    let b = alloc.allocate(300).unwrap();
    let c = alloc.allocate(64).unwrap();
    assert_ne!(a.addr, 0);
    assert_ne!(a.addr, b.addr);
    assert_ne!(b.addr, c.addr);
    for x in [&a, &b, &c] {
        assert_eq!(x.addr % 256, 0);
    }
}

#[test]
fn addresses_are_not_reused_after_free() {
    let alloc = MockDeviceAllocator::new(4096, 0);
    let a = alloc.allocate(128).unwrap();
    alloc.deallocate(&a).unwrap();
    let b = alloc.allocate(128).unwrap();
    assert_ne!(a.addr, b.addr);
}

#[test]
fn device_index_is_preserved() {
    let alloc = MockDeviceAllocator::new(4096, 7);
    let a = alloc.allocate(64).unwrap();
    assert_eq!(a.device_index, 7);
    assert_eq!(alloc.current_device(), Ok(7));
}

#[test]
fn injected_allocation_fault_fires_once() {
    let alloc = MockDeviceAllocator::new(4096, 0);
    alloc.fail_next_allocation(DeviceError::Driver { code: 999, message: "boom".into() });
    assert!(matches!(alloc.allocate(64), Err(DeviceError::Driver { code: 999, .. })));
    assert!(alloc.allocate(64).is_ok());
}

#[test]
fn injected_deallocation_fault_still_releases_memory() {
    let alloc = MockDeviceAllocator::new(4096, 0);
    let a = alloc.allocate(64).unwrap();
    alloc.fail_next_deallocation(DeviceError::Driver { code: 3, message: "ecc".into() });
    assert!(alloc.deallocate(&a).is_err());
    assert_eq!(alloc.leak_count(), 0);
    assert_eq!(alloc.allocated_bytes(), 0);
}

#[test]
fn injected_device_query_fault_fires_once() {
    let alloc = MockDeviceAllocator::new(4096, 2);
    alloc.fail_device_query(DeviceError::NoDevice);
    assert_eq!(alloc.current_device(), Err(DeviceError::NoDevice));
    assert_eq!(alloc.current_device(), Ok(2));
}

#[test]
fn stress_test_1000_cycles_zero_drift() {
    let alloc = MockDeviceAllocator::new(1024 * 1024, 0);
    for _ in 0..1000 {
        let a = alloc.allocate(1024).unwrap();
        alloc.deallocate(&a).unwrap();
    }
    assert_eq!(alloc.allocated_bytes(), 0);
    assert_eq!(alloc.leak_count(), 0);
}

#[test]
fn error_codes_are_stable() {
    assert_eq!(DeviceError::OutOfMemory { required: 1, available: 0 }.code(), 2);
    assert_eq!(DeviceError::NoDevice.code(), 100);
    assert_eq!(DeviceError::Driver { code: 42, message: String::new() }.code(), 42);
}
