// Copyright 2024-2026 blas-workspace Contributors
// SPDX-License-Identifier: Apache-2.0

//! Handle configuration loading from environment variables.
//!
//! Configuration is resolved once, when a handle is created. Every value can
//! also be supplied through [`WorkspaceConfig::from_lookup`], which takes an
//! arbitrary key lookup so callers and tests never have to touch the process
//! environment. Invalid values fall back to defaults without failing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `BLASWS_DEVICE_MEMORY_SIZE` | 1048576 | Initial arena size (bytes) |
//! | `WORKBUF_TRSM_B_CHNK` | - | Obsolete; only triggers a deprecation warning |
//! | `BLASWS_LAYER` | 0 | Layer-mode bitmask (1 trace, 2 bench, 4 profile) |
//! | `BLASWS_LOG_TRACE_PATH` | - | Trace sink file |
//! | `BLASWS_LOG_BENCH_PATH` | - | Bench sink file |
//! | `BLASWS_LOG_PROFILE_PATH` | - | Profile sink file |
//! | `BLASWS_LOG_PATH` | - | Shared fallback file for all sinks |
//!
//! Numeric values accept decimal, `0x` hexadecimal and leading-`0` octal.

use std::path::PathBuf;

use serde::Serialize;

use crate::telemetry::{LayerMode, SinkTarget};
use crate::workspace::{roundup_device_memory_size, DEFAULT_DEVICE_MEMORY_SIZE};

pub const ENV_DEVICE_MEMORY_SIZE: &str = "BLASWS_DEVICE_MEMORY_SIZE";
pub const ENV_LEGACY_DEVICE_MEMORY_SIZE: &str = "WORKBUF_TRSM_B_CHNK";
pub const ENV_LAYER: &str = "BLASWS_LAYER";
pub const ENV_LOG_TRACE_PATH: &str = "BLASWS_LOG_TRACE_PATH";
pub const ENV_LOG_BENCH_PATH: &str = "BLASWS_LOG_BENCH_PATH";
pub const ENV_LOG_PROFILE_PATH: &str = "BLASWS_LOG_PROFILE_PATH";
pub const ENV_LOG_PATH: &str = "BLASWS_LOG_PATH";

/// Every variable the loader reads.
pub const ENV_KEYS: &[&str] = &[
    ENV_DEVICE_MEMORY_SIZE,
    ENV_LEGACY_DEVICE_MEMORY_SIZE,
    ENV_LAYER,
    ENV_LOG_TRACE_PATH,
    ENV_LOG_BENCH_PATH,
    ENV_LOG_PROFILE_PATH,
    ENV_LOG_PATH,
];

/// Configuration consumed once at handle construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkspaceConfig {
    /// Initial arena size override. `None` selects the compiled-in default.
    pub device_memory_size: Option<usize>,
    /// The obsolete size variable is set.
    pub legacy_size_override: bool,
    pub layer_mode: LayerMode,
    pub trace_path: Option<PathBuf>,
    pub bench_path: Option<PathBuf>,
    pub profile_path: Option<PathBuf>,
    /// Shared fallback for sinks without their own path.
    pub log_path: Option<PathBuf>,
}

/// Resolved values, as a handle created from this configuration would see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub device_memory_size: usize,
    pub size_source: &'static str,
    pub layer_mode: u32,
    pub trace_sink: Option<String>,
    pub bench_sink: Option<String>,
    pub profile_sink: Option<String>,
}

/// Parse a size in `strtoul(.., 0)` notation. Returns `None` on invalid input.
pub fn parse_size(value: &str) -> Option<usize> {
    let v = value.trim();
    if let Some(hex) = v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else if v.len() > 1 && v.starts_with('0') {
        usize::from_str_radix(&v[1..], 8).ok()
    } else {
        v.parse::<usize>().ok()
    }
}

fn non_empty_path(value: Option<String>) -> Option<PathBuf> {
    value.filter(|s| !s.is_empty()).map(PathBuf::from)
}

impl WorkspaceConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// A size of `0` is treated as absent, like a missing variable.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let device_memory_size = lookup(ENV_DEVICE_MEMORY_SIZE)
            .as_deref()
            .and_then(parse_size)
            .filter(|&n| n > 0);
        let legacy_size_override = lookup(ENV_LEGACY_DEVICE_MEMORY_SIZE).is_some();
        let layer_mode = lookup(ENV_LAYER)
            .as_deref()
            .map(LayerMode::parse)
            .unwrap_or_default();

        Self {
            device_memory_size,
            legacy_size_override,
            layer_mode,
            trace_path: non_empty_path(lookup(ENV_LOG_TRACE_PATH)),
            bench_path: non_empty_path(lookup(ENV_LOG_BENCH_PATH)),
            profile_path: non_empty_path(lookup(ENV_LOG_PROFILE_PATH)),
            log_path: non_empty_path(lookup(ENV_LOG_PATH)),
        }
    }

    /// Initial arena size after rounding, falling back to the default.
    pub fn initial_device_memory_size(&self) -> usize {
        let requested = self.device_memory_size.unwrap_or(DEFAULT_DEVICE_MEMORY_SIZE);
        roundup_device_memory_size(requested).unwrap_or(DEFAULT_DEVICE_MEMORY_SIZE)
    }

    /// Whether the obsolete variable should produce a deprecation warning.
    pub fn warns_legacy_override(&self) -> bool {
        self.legacy_size_override && self.device_memory_size.is_none()
    }

    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        let sink = |enabled: bool, own: &Option<PathBuf>| {
            enabled.then(|| SinkTarget::resolve(own.as_deref(), self.log_path.as_deref()).to_string())
        };
        EffectiveConfig {
            device_memory_size: self.initial_device_memory_size(),
            size_source: if self.device_memory_size.is_some() { "override" } else { "default" },
            layer_mode: self.layer_mode.bits(),
            trace_sink: sink(self.layer_mode.trace(), &self.trace_path),
            bench_sink: sink(self.layer_mode.bench(), &self.bench_path),
            profile_sink: sink(self.layer_mode.profile(), &self.profile_path),
        }
    }
}
