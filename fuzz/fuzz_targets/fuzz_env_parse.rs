//! Fuzz target for environment value parsing.
//!
//! Arbitrary strings for the size and layer variables must never panic and
//! must always yield a chunk-aligned initial size.

#![no_main]

use libfuzzer_sys::fuzz_target;
use blas_workspace::config::{parse_size, WorkspaceConfig};
use blas_workspace::workspace::MIN_CHUNK_SIZE;

fuzz_target!(|data: (String, String)| {
    let (size, layer) = data;
    let _ = parse_size(&size);

    let config = WorkspaceConfig::from_lookup(|key| match key {
        "BLASWS_DEVICE_MEMORY_SIZE" => Some(size.clone()),
        "BLASWS_LAYER" => Some(layer.clone()),
        _ => None,
    });
    let initial = config.initial_device_memory_size();
    assert_eq!(initial % MIN_CHUNK_SIZE, 0);
    assert!(config.layer_mode.bits() <= 7);
});
