//! Device workspace management for accelerated BLAS handles.
//!
//! Every execution handle owns one contiguous device-memory arena that
//! kernels borrow as scratch space. The arena is allocated eagerly when the
//! handle is created, resized only on explicit request, and freed when the
//! handle is destroyed. A two-phase size query lets callers discover how much
//! workspace a sequence of library calls would need without running them.
//!
//! # Modules
//!
//! - [`device`]: driver allocate/free seam and the simulated device
//! - [`workspace`]: arena, size query, handle lifecycle, kernel dispatch
//! - [`config`]: environment-driven configuration
//! - [`telemetry`]: tracing setup, layer sinks, metrics
//! - `ffi`: C entry points (feature `ffi`)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use blas_workspace::config::WorkspaceConfig;
//! use blas_workspace::device::MockDeviceAllocator;
//! use blas_workspace::workspace::WorkspaceHandle;
//!
//! let device = Arc::new(MockDeviceAllocator::new(1 << 30, 0));
//! let mut handle = WorkspaceHandle::new(&WorkspaceConfig::default(), device)?;
//!
//! handle.start_device_memory_size_query()?;
//! handle.request_device_memory_size(3 << 20)?;
//! let needed = handle.stop_device_memory_size_query()?;
//! handle.set_device_memory_size(needed)?;
//! assert_eq!(handle.get_device_memory_size(), 3 << 20);
//! # Ok::<(), blas_workspace::workspace::WorkspaceError>(())
//! ```

pub mod cli;
pub mod config;
pub mod device;
pub mod telemetry;
pub mod workspace;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use config::WorkspaceConfig;
pub use workspace::{WorkspaceError, WorkspaceHandle};
