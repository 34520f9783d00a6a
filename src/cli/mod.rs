// Copyright 2024-2026 blas-workspace Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommands for `blasws-cli`.
//!
//! ## Usage
//!
//! ```bash
//! blasws-cli config show [--json]   # Effective configuration
//! blasws-cli config defaults        # Documented defaults
//! blasws-cli config validate        # Check env vars for mistakes
//! blasws-cli probe 1000 500 2000    # Query window + resize on the simulated device
//! ```

pub mod config_cmd;
pub mod probe_cmd;

pub use probe_cmd::{run_probe, ProbeReport};
