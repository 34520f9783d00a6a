// Copyright 2024-2026 blas-workspace Contributors
// Licensed under the Apache License, Version 2.0

//! Kernel dispatch against the workspace arena.
//!
//! A library call typically has several algorithm variants with different
//! scratch requirements. In query mode every variant's requirement is fed to
//! the size query and nothing runs; otherwise the first variant that fits
//! the arena is launched on a checkout of exactly its requirement.

use std::error::Error;

use super::checkout::Checkout;
use super::error::WorkspaceError;
use super::handle::WorkspaceHandle;
use super::query::SizeQueryOutcome;

/// One candidate implementation of a library call.
pub trait KernelVariant {
    fn name(&self) -> &str;

    /// Scratch bytes this variant needs from the arena.
    fn workspace_bytes(&self) -> usize;

    fn launch(&self, workspace: &Checkout) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Result of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Query mode: sizes were recorded, nothing launched.
    Queried(SizeQueryOutcome),
    /// The variant at this index was launched.
    Launched { variant: usize },
}

impl WorkspaceHandle {
    /// Dispatch one library call over its candidate `variants`, in order of
    /// preference.
    pub fn dispatch(
        &mut self,
        variants: &[&dyn KernelVariant],
    ) -> Result<DispatchOutcome, WorkspaceError> {
        if variants.is_empty() {
            return Err(WorkspaceError::InvalidValue("no kernel variants".into()));
        }

        if self.is_device_memory_size_query() {
            let mut outcome = SizeQueryOutcome::Unchanged;
            for variant in variants {
                if self.request_device_memory_size(variant.workspace_bytes())?
                    == SizeQueryOutcome::Increased
                {
                    outcome = SizeQueryOutcome::Increased;
                }
            }
            return Ok(DispatchOutcome::Queried(outcome));
        }

        let available = self.arena_size();
        let Some((index, variant)) = variants
            .iter()
            .enumerate()
            .find(|(_, v)| v.workspace_bytes() <= available)
        else {
            let requested = variants.iter().map(|v| v.workspace_bytes()).min().unwrap_or(0);
            return Err(WorkspaceError::InsufficientArena { requested, available });
        };

        let bytes = variant.workspace_bytes();
        let workspace = self.checkout(bytes)?;
        let result = variant.launch(&workspace);
        drop(workspace);

        result.map_err(|e| WorkspaceError::KernelFailed {
            kernel: variant.name().to_string(),
            reason: e.to_string(),
        })?;

        if let Some(sink) = self.sinks().trace() {
            sink.write_line(format_args!(
                "handle{},dispatch,{},{bytes}",
                self.device_id(),
                variant.name()
            ));
        }
        if let Some(sink) = self.sinks().bench() {
            sink.write_line(format_args!(
                "blasws-bench --kernel {} --workspace {bytes} --device {}",
                variant.name(),
                self.device_id()
            ));
        }
        self.record_launch(variant.name(), bytes);
        Ok(DispatchOutcome::Launched { variant: index })
    }
}
