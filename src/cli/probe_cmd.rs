// Copyright 2024-2026 blas-workspace Contributors
// SPDX-License-Identifier: Apache-2.0

//! `probe`: run one query window over candidate sizes on the simulated
//! device, resize to the result and report what happened.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{parse_size, WorkspaceConfig};
use crate::device::{DeviceAllocator, MockDeviceAllocator, SIMULATED_DEVICE_CAPACITY};
use crate::workspace::{SizeQueryOutcome, WorkspaceError, WorkspaceHandle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub device_id: usize,
    pub candidates: Vec<usize>,
    /// Candidates that raised the running maximum.
    pub increases: usize,
    pub query_max: usize,
    pub size_before: usize,
    pub size_after: usize,
}

/// Run the probe sequence against `allocator`.
pub fn probe(
    config: &WorkspaceConfig,
    allocator: Arc<dyn DeviceAllocator>,
    candidates: &[usize],
) -> Result<ProbeReport, WorkspaceError> {
    let mut handle = WorkspaceHandle::new(config, allocator)?;
    let size_before = handle.get_device_memory_size();

    handle.start_device_memory_size_query()?;
    let mut increases = 0;
    for &candidate in candidates {
        if handle.request_device_memory_size(candidate)? == SizeQueryOutcome::Increased {
            increases += 1;
        }
    }
    let query_max = handle.stop_device_memory_size_query()?;
    handle.set_device_memory_size(query_max)?;

    Ok(ProbeReport {
        device_id: handle.device_id(),
        candidates: candidates.to_vec(),
        increases,
        query_max,
        size_before,
        size_after: handle.get_device_memory_size(),
    })
}

/// CLI entry: parse sizes, probe, print JSON. Returns the exit code.
pub fn run_probe(args: &[String]) -> i32 {
    if args.is_empty() {
        eprintln!("Usage: blasws-cli probe <size>...");
        return 2;
    }
    let mut candidates = Vec::with_capacity(args.len());
    for arg in args {
        match parse_size(arg) {
            Some(n) => candidates.push(n),
            None => {
                eprintln!("Invalid size: {arg}");
                return 2;
            }
        }
    }

    let allocator = Arc::new(MockDeviceAllocator::new(SIMULATED_DEVICE_CAPACITY, 0));
    match probe(&WorkspaceConfig::from_env(), allocator, &candidates) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(text) => {
                println!("{text}");
                0
            }
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                1
            }
        },
        Err(e) => {
            eprintln!("Probe failed: {e}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{DEFAULT_DEVICE_MEMORY_SIZE, MIN_CHUNK_SIZE};

    #[test]
    fn test_probe_resizes_to_query_max() {
        let alloc = Arc::new(MockDeviceAllocator::new(1 << 30, 0));
        let report = probe(&WorkspaceConfig::default(), alloc.clone(), &[1000, 500, 2000]).unwrap();
        assert_eq!(report.size_before, DEFAULT_DEVICE_MEMORY_SIZE);
        assert_eq!(report.query_max, 2000);
        assert_eq!(report.increases, 2);
        assert_eq!(report.size_after, MIN_CHUNK_SIZE);
        assert_eq!(alloc.allocated_bytes(), 0);
    }

    #[test]
    fn test_probe_without_candidates_empties_arena() {
        let alloc = Arc::new(MockDeviceAllocator::new(1 << 30, 0));
        let report = probe(&WorkspaceConfig::default(), alloc, &[]).unwrap();
        assert_eq!(report.query_max, 0);
        assert_eq!(report.size_after, 0);
    }

    #[test]
    fn test_probe_reports_allocation_failure() {
        let alloc = Arc::new(MockDeviceAllocator::new(2 * DEFAULT_DEVICE_MEMORY_SIZE, 0));
        let err = probe(&WorkspaceConfig::default(), alloc, &[4 * DEFAULT_DEVICE_MEMORY_SIZE]);
        assert!(matches!(err, Err(WorkspaceError::Device(_))));
    }

    #[test]
    fn test_run_probe_rejects_bad_args() {
        assert_eq!(run_probe(&[]), 2);
        assert_eq!(run_probe(&["12k".to_string()]), 2);
    }

    #[test]
    fn test_report_serializes() {
        let report = ProbeReport {
            device_id: 0,
            candidates: vec![1],
            increases: 1,
            query_max: 1,
            size_before: 0,
            size_after: MIN_CHUNK_SIZE,
        };
        let v: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(v["query_max"], 1);
        assert_eq!(v["size_after"], MIN_CHUNK_SIZE);
    }
}
