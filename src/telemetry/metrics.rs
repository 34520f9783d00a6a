//! Metrics facade hooks. No-ops unless the host installs a recorder.

use metrics::{counter, gauge};

/// Current arena capacity of a handle on `device`.
pub fn record_arena_size(device: usize, bytes: usize) {
    gauge!("blasws_arena_bytes", "device" => device.to_string()).set(bytes as f64);
}

pub fn record_resize(success: bool) {
    let outcome = if success { "ok" } else { "error" };
    counter!("blasws_resize_total", "outcome" => outcome).increment(1);
}

pub fn record_query_window() {
    counter!("blasws_query_windows_total").increment(1);
}

pub fn record_kernel_launch(kernel: &str) {
    counter!("blasws_kernel_launches_total", "kernel" => kernel.to_string()).increment(1);
}
