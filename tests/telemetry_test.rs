//! Layer logging through handles created from env-style configuration.

use std::collections::HashMap;
use std::sync::Arc;

use blas_workspace::config::WorkspaceConfig;
use blas_workspace::device::MockDeviceAllocator;
use blas_workspace::telemetry::{build_filter, LayerMode, LogSinks, SinkTarget};
use blas_workspace::workspace::WorkspaceHandle;

fn config(pairs: &[(&str, String)]) -> WorkspaceConfig {
    let map: HashMap<String, String> =
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    WorkspaceConfig::from_lookup(move |k| map.get(k).cloned())
}

#[test]
fn trace_lines_go_to_shared_log_path() {
    let dir = tempfile::tempdir().unwrap();
    let shared = dir.path().join("blasws.log");
    let cfg = config(&[
        ("BLASWS_LAYER", "1".to_string()),
        ("BLASWS_LOG_PATH", shared.display().to_string()),
    ]);
    assert_eq!(cfg.layer_mode, LayerMode::LOG_TRACE);
    {
        let alloc = Arc::new(MockDeviceAllocator::new(1 << 30, 2));
        let mut handle = WorkspaceHandle::new(&cfg, alloc).unwrap();
        handle.set_device_memory_size(1).unwrap();
        handle.get_device_memory_size();
    }
    let text = std::fs::read_to_string(&shared).unwrap();
    assert_eq!(
        text,
        "handle2,set_device_memory_size,1\nhandle2,get_device_memory_size\n"
    );
}

#[test]
fn own_path_wins_over_shared_path() {
    let dir = tempfile::tempdir().unwrap();
    let own = dir.path().join("bench.log");
    let shared = dir.path().join("all.log");
    let cfg = config(&[
        ("BLASWS_LAYER", "3".to_string()),
        ("BLASWS_LOG_BENCH_PATH", own.display().to_string()),
        ("BLASWS_LOG_PATH", shared.display().to_string()),
    ]);
    let sinks = LogSinks::open(&cfg);
    assert_eq!(sinks.bench().unwrap().target(), &SinkTarget::File(own));
    assert_eq!(sinks.trace().unwrap().target(), &SinkTarget::File(shared));
    assert!(sinks.profile().is_none());
}

#[test]
fn layers_off_by_default() {
    let cfg = config(&[]);
    let alloc = Arc::new(MockDeviceAllocator::new(1 << 30, 0));
    let handle = WorkspaceHandle::new(&cfg, alloc).unwrap();
    assert_eq!(handle.layer_mode(), LayerMode::NONE);
}

#[test]
fn filter_directives_validate() {
    assert!(build_filter("blas_workspace=debug").is_ok());
    assert!(build_filter("blas_workspace=notalevel").is_err());
}
