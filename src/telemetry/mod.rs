//! Telemetry for blas-workspace.
//!
//! Process diagnostics go through `tracing`; per-handle layer logging goes
//! to the trace, bench and profile sinks selected by the layer mode.

mod layer;
mod logging;
mod metrics;

pub use layer::{KernelProfile, LayerMode, LogSink, LogSinks, SinkTarget};
pub use logging::{build_filter, init_logging, LogConfig, LogError, LogFormat};
pub use metrics::{record_arena_size, record_kernel_launch, record_query_window, record_resize};
