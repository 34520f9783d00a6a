// Copyright 2024-2026 blas-workspace Contributors
// Licensed under the Apache License, Version 2.0

//! Per-handle layer logging: trace, bench and profile sinks.
//!
//! Each sink is enabled by one bit of the layer mode and opened against its
//! own path, else the shared log path, else stderr.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::ops::BitOr;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

use crate::config::{parse_size, WorkspaceConfig};

/// Layer-mode bitmask selecting which sinks a handle opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LayerMode(u32);

impl LayerMode {
    pub const NONE: Self = Self(0);
    pub const LOG_TRACE: Self = Self(0b001);
    pub const LOG_BENCH: Self = Self(0b010);
    pub const LOG_PROFILE: Self = Self(0b100);

    const ALL_BITS: u32 = 0b111;

    /// Unknown bits are dropped.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & Self::ALL_BITS)
    }

    /// Parse a bitmask in `strtol(.., 0)` notation; invalid input disables all sinks.
    pub fn parse(value: &str) -> Self {
        parse_size(value).map_or(Self::NONE, |n| Self::from_bits(n as u32))
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn trace(self) -> bool {
        self.contains(Self::LOG_TRACE)
    }

    pub const fn bench(self) -> bool {
        self.contains(Self::LOG_BENCH)
    }

    pub const fn profile(self) -> bool {
        self.contains(Self::LOG_PROFILE)
    }
}

impl BitOr for LayerMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Where a sink writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Stderr,
    File(PathBuf),
}

impl SinkTarget {
    pub fn resolve(own: Option<&Path>, shared: Option<&Path>) -> Self {
        match own.or(shared) {
            Some(path) => Self::File(path.to_path_buf()),
            None => Self::Stderr,
        }
    }
}

impl fmt::Display for SinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkTarget::Stderr => write!(f, "stderr"),
            SinkTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One open log destination. Lines are flushed as they are written.
pub struct LogSink {
    target: SinkTarget,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LogSink {
    /// Open `target`. A file that cannot be opened degrades to stderr.
    pub fn open(target: SinkTarget) -> Self {
        let (target, writer): (SinkTarget, Box<dyn Write + Send>) = match target {
            SinkTarget::Stderr => (SinkTarget::Stderr, Box::new(std::io::stderr())),
            SinkTarget::File(path) => {
                match OpenOptions::new().create(true).append(true).open(&path) {
                    Ok(file) => (SinkTarget::File(path), Box::new(file)),
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "cannot open log file, logging to stderr"
                        );
                        (SinkTarget::Stderr, Box::new(std::io::stderr()))
                    }
                }
            }
        };
        Self { target, writer: Mutex::new(writer) }
    }

    pub fn target(&self) -> &SinkTarget {
        &self.target
    }

    pub fn write_line(&self, args: fmt::Arguments<'_>) {
        let mut w = self.writer.lock();
        let _ = w.write_fmt(args);
        let _ = w.write_all(b"\n");
        let _ = w.flush();
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink").field("target", &self.target).finish()
    }
}

/// The sinks of one handle; disabled sinks are `None`.
#[derive(Debug, Default)]
pub struct LogSinks {
    mode: LayerMode,
    trace: Option<LogSink>,
    bench: Option<LogSink>,
    profile: Option<LogSink>,
}

impl LogSinks {
    pub fn open(config: &WorkspaceConfig) -> Self {
        let mode = config.layer_mode;
        let shared = config.log_path.as_deref();
        let open = |enabled: bool, own: &Option<PathBuf>| {
            enabled.then(|| LogSink::open(SinkTarget::resolve(own.as_deref(), shared)))
        };
        Self {
            mode,
            trace: open(mode.trace(), &config.trace_path),
            bench: open(mode.bench(), &config.bench_path),
            profile: open(mode.profile(), &config.profile_path),
        }
    }

    pub fn mode(&self) -> LayerMode {
        self.mode
    }

    pub fn trace(&self) -> Option<&LogSink> {
        self.trace.as_ref()
    }

    pub fn bench(&self) -> Option<&LogSink> {
        self.bench.as_ref()
    }

    pub fn profile(&self) -> Option<&LogSink> {
        self.profile.as_ref()
    }
}

#[derive(Debug, Serialize)]
struct ProfileEntry<'a> {
    kernel: &'a str,
    workspace_bytes: usize,
    count: u64,
}

/// Launch counts per (kernel, workspace size), emitted once at teardown.
#[derive(Debug, Default)]
pub struct KernelProfile {
    counts: BTreeMap<(String, usize), u64>,
}

impl KernelProfile {
    pub fn record(&mut self, kernel: &str, workspace_bytes: usize) {
        *self.counts.entry((kernel.to_string(), workspace_bytes)).or_insert(0) += 1;
    }

    pub fn count(&self, kernel: &str, workspace_bytes: usize) -> u64 {
        self.counts
            .get(&(kernel.to_string(), workspace_bytes))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Write one JSON object per entry.
    pub fn write_to(&self, sink: &LogSink) {
        for ((kernel, workspace_bytes), count) in &self.counts {
            let entry = ProfileEntry {
                kernel: kernel.as_str(),
                workspace_bytes: *workspace_bytes,
                count: *count,
            };
            if let Ok(line) = serde_json::to_string(&entry) {
                sink.write_line(format_args!("{line}"));
            }
        }
    }
}
