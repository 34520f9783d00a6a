//! Workspace error types.
//!
//! Failures never leave the arena half-updated: an error returned after the
//! old buffer was released leaves the arena empty.

use thiserror::Error;

use crate::device::DeviceError;

/// Errors returned by handle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    #[error("Size query mismatch: {0}")]
    SizeQueryMismatch(&'static str),

    #[error("Device memory is in use")]
    ArenaInUse,

    #[error("Workspace too small: requested {requested} bytes, arena holds {available} bytes")]
    InsufficientArena { requested: usize, available: usize },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Kernel {kernel} failed: {reason}")]
    KernelFailed { kernel: String, reason: String },

    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl WorkspaceError {
    /// Returns true if the error is a caller protocol violation rather than
    /// a resource or driver failure.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::SizeQueryMismatch(_) | Self::ArenaInUse | Self::InvalidValue(_)
        )
    }
}
