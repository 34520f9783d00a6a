// Copyright 2024-2026 blas-workspace Contributors
// Licensed under the Apache License, Version 2.0

//! Workspace handle: arena lifecycle, size queries and resizing.
//!
//! A handle is a single-owner resource bound to one device. Every operation
//! decides immediately from the current state; nothing waits for a kernel
//! to finish. Callers must synchronize outstanding device work themselves
//! before resizing.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{WorkspaceConfig, ENV_DEVICE_MEMORY_SIZE, ENV_LEGACY_DEVICE_MEMORY_SIZE};
use crate::device::DeviceAllocator;
use crate::telemetry::{self, KernelProfile, LayerMode, LogSinks};

use super::arena::ArenaStore;
use super::checkout::Checkout;
use super::error::WorkspaceError;
use super::query::{SizeQuery, SizeQueryOutcome};

static LEGACY_WARNED: AtomicBool = AtomicBool::new(false);

/// Emit the obsolete-variable warning. Returns false if it was already
/// emitted by this process.
pub(crate) fn warn_legacy_override_once() -> bool {
    if LEGACY_WARNED.swap(true, Ordering::AcqRel) {
        return false;
    }
    tracing::warn!(
        "environment variable {} is obsolete; use {} instead",
        ENV_LEGACY_DEVICE_MEMORY_SIZE,
        ENV_DEVICE_MEMORY_SIZE
    );
    eprintln!(
        "Warning: Environment variable {ENV_LEGACY_DEVICE_MEMORY_SIZE} is obsolete.\n\
         Use {ENV_DEVICE_MEMORY_SIZE} instead."
    );
    true
}

/// Unrecoverable teardown fault: report and terminate the process.
fn fatal(message: fmt::Arguments<'_>) -> ! {
    tracing::error!("{message}");
    eprintln!("blas-workspace internal error: {message}");
    std::process::abort()
}

/// Execution handle owning one device workspace arena.
pub struct WorkspaceHandle {
    device_id: usize,
    arena: ArenaStore,
    query: SizeQuery,
    sinks: LogSinks,
    profile: KernelProfile,
    allocator: Arc<dyn DeviceAllocator>,
}

impl WorkspaceHandle {
    /// Create a handle on the allocator's active device and allocate the
    /// initial arena eagerly.
    pub fn new(
        config: &WorkspaceConfig,
        allocator: Arc<dyn DeviceAllocator>,
    ) -> Result<Self, WorkspaceError> {
        let device_id = allocator.current_device()?;

        if config.warns_legacy_override() {
            warn_legacy_override_once();
        }

        let initial = config.initial_device_memory_size();
        let mut arena = ArenaStore::default();
        arena.replace(allocator.as_ref(), initial)?;

        tracing::debug!(device_id, size = initial, "workspace handle created");
        telemetry::record_arena_size(device_id, initial);

        Ok(Self {
            device_id,
            arena,
            query: SizeQuery::Idle,
            sinks: LogSinks::open(config),
            profile: KernelProfile::default(),
            allocator,
        })
    }

    pub fn device_id(&self) -> usize {
        self.device_id
    }

    pub fn layer_mode(&self) -> LayerMode {
        self.sinks.mode()
    }

    /// Current arena capacity in bytes.
    pub fn get_device_memory_size(&self) -> usize {
        self.log_trace(format_args!("get_device_memory_size"));
        self.arena.size()
    }

    pub fn device_memory_addr(&self) -> Option<u64> {
        self.arena.addr()
    }

    pub fn is_device_memory_in_use(&self) -> bool {
        self.arena.is_in_use()
    }

    /// Arena growth is caller-driven only; the library never resizes on its own.
    pub fn is_managing_device_memory(&self) -> bool {
        false
    }

    pub fn is_device_memory_size_query(&self) -> bool {
        self.query.is_active()
    }

    pub fn start_device_memory_size_query(&mut self) -> Result<(), WorkspaceError> {
        self.log_trace(format_args!("start_device_memory_size_query"));
        self.query.start()?;
        telemetry::record_query_window();
        Ok(())
    }

    /// Record that a kernel variant would need `candidate` bytes.
    pub fn request_device_memory_size(
        &mut self,
        candidate: usize,
    ) -> Result<SizeQueryOutcome, WorkspaceError> {
        self.query.request(candidate)
    }

    /// Close the query window and return the largest requested size.
    pub fn stop_device_memory_size_query(&mut self) -> Result<usize, WorkspaceError> {
        self.log_trace(format_args!("stop_device_memory_size_query"));
        let size = self.query.stop()?;
        tracing::debug!(device_id = self.device_id, size, "size query closed");
        Ok(size)
    }

    /// Replace the arena with one of at least `requested` bytes.
    ///
    /// Fails immediately while a checkout is alive. If the old buffer was
    /// already released when a failure occurs, the arena is left empty and
    /// the handle stays usable.
    pub fn set_device_memory_size(&mut self, requested: usize) -> Result<(), WorkspaceError> {
        self.log_trace(format_args!("set_device_memory_size,{requested}"));
        let result = self.arena.replace(self.allocator.as_ref(), requested);
        telemetry::record_resize(result.is_ok());
        telemetry::record_arena_size(self.device_id, self.arena.size());
        match result {
            Ok(size) => {
                tracing::debug!(device_id = self.device_id, requested, size, "arena resized");
                Ok(())
            }
            Err(e) => {
                tracing::debug!(
                    device_id = self.device_id,
                    requested,
                    size = self.arena.size(),
                    error = %e,
                    "arena resize failed"
                );
                Err(e)
            }
        }
    }

    /// Mark the arena in use for one kernel invocation needing `size` bytes.
    ///
    /// Rejected while a size query is open: query mode and real execution
    /// are mutually exclusive.
    pub fn checkout(&self, size: usize) -> Result<Checkout, WorkspaceError> {
        if self.query.is_active() {
            return Err(WorkspaceError::SizeQueryMismatch(
                "cannot check out device memory during a size query",
            ));
        }
        if self.arena.is_in_use() {
            return Err(WorkspaceError::ArenaInUse);
        }
        let available = self.arena.size();
        if size > available {
            return Err(WorkspaceError::InsufficientArena { requested: size, available });
        }
        Checkout::acquire(self.arena.in_use_flag(), self.arena.addr(), size)
    }

    pub(crate) fn arena_size(&self) -> usize {
        self.arena.size()
    }

    pub(crate) fn sinks(&self) -> &LogSinks {
        &self.sinks
    }

    pub(crate) fn record_launch(&mut self, kernel: &str, workspace_bytes: usize) {
        if self.sinks.profile().is_some() {
            self.profile.record(kernel, workspace_bytes);
        }
        telemetry::record_kernel_launch(kernel);
    }

    fn log_trace(&self, args: fmt::Arguments<'_>) {
        if let Some(sink) = self.sinks.trace() {
            sink.write_line(format_args!("handle{},{}", self.device_id, args));
        }
    }
}

impl fmt::Debug for WorkspaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceHandle")
            .field("device_id", &self.device_id)
            .field("arena", &self.arena)
            .field("query", &self.query)
            .field("layer_mode", &self.sinks.mode())
            .finish()
    }
}

impl Drop for WorkspaceHandle {
    fn drop(&mut self) {
        if self.arena.is_in_use() {
            fatal(format_args!(
                "Handle object destroyed while device memory still in use."
            ));
        }
        if let Err(e) = self.arena.release(self.allocator.as_ref()) {
            fatal(format_args!(
                "error during device free in handle destructor: {e} (code {})",
                e.code()
            ));
        }
        if let Some(sink) = self.sinks.profile() {
            self.profile.write_to(sink);
        }
        telemetry::record_arena_size(self.device_id, 0);
        tracing::debug!(device_id = self.device_id, "workspace handle destroyed");
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
