// Copyright 2024-2026 blas-workspace Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.
//!
//! These commands read the same environment variables a handle reads at
//! creation, without creating one.

use std::path::Path;

use crate::config::{
    parse_size, EffectiveConfig, WorkspaceConfig, ENV_DEVICE_MEMORY_SIZE, ENV_LAYER,
    ENV_LEGACY_DEVICE_MEMORY_SIZE,
};
use crate::workspace::{DEFAULT_DEVICE_MEMORY_SIZE, MIN_CHUNK_SIZE};

/// Print the effective config as `KEY=value` lines, or JSON.
pub fn run_show(json: bool) -> i32 {
    let cfg = WorkspaceConfig::from_env().effective_config();
    if json {
        match serde_json::to_string_pretty(&cfg) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Failed to serialize config: {e}");
                return 1;
            }
        }
    } else {
        print_config(&cfg);
    }
    0
}

/// Print documented default values.
pub fn run_defaults() {
    println!("BLASWS_DEVICE_MEMORY_SIZE={DEFAULT_DEVICE_MEMORY_SIZE}");
    println!("BLASWS_MIN_CHUNK_SIZE={MIN_CHUNK_SIZE}");
    println!("BLASWS_LAYER=0");
}

/// Check environment values for mistakes a handle would silently ignore.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let warnings = validate(|key| std::env::var(key).ok());
    for w in &warnings {
        eprintln!("WARNING: {w}");
    }
    if warnings.is_empty() {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

/// Collect warnings for the values returned by `lookup`.
pub fn validate<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut warnings = Vec::new();

    if let Some(raw) = lookup(ENV_DEVICE_MEMORY_SIZE) {
        if parse_size(&raw).is_none() {
            warnings.push(format!(
                "{ENV_DEVICE_MEMORY_SIZE}={raw:?} is not a number; the default is used"
            ));
        }
    }
    if let Some(raw) = lookup(ENV_LAYER) {
        match parse_size(&raw) {
            None => warnings.push(format!("{ENV_LAYER}={raw:?} is not a number; layers disabled")),
            Some(bits) if bits > 7 => {
                warnings.push(format!("{ENV_LAYER}={raw} has unknown bits; only 1, 2 and 4 are used"))
            }
            Some(_) => {}
        }
    }

    let cfg = WorkspaceConfig::from_lookup(&lookup);
    if cfg.warns_legacy_override() {
        warnings.push(format!(
            "{ENV_LEGACY_DEVICE_MEMORY_SIZE} is obsolete; use {ENV_DEVICE_MEMORY_SIZE} instead"
        ));
    }

    let effective = cfg.effective_config();
    for sink in [&effective.trace_sink, &effective.bench_sink, &effective.profile_sink]
        .into_iter()
        .flatten()
    {
        if sink == "stderr" {
            continue;
        }
        let dir = Path::new(sink).parent().filter(|p| !p.as_os_str().is_empty());
        if dir.is_some_and(|d| !d.is_dir()) {
            warnings.push(format!("log directory for {sink} does not exist; sink uses stderr"));
        }
    }

    warnings
}

fn print_config(cfg: &EffectiveConfig) {
    println!("BLASWS_DEVICE_MEMORY_SIZE={}", cfg.device_memory_size);
    println!("BLASWS_DEVICE_MEMORY_SIZE_SOURCE={}", cfg.size_source);
    println!("BLASWS_LAYER={}", cfg.layer_mode);
    println!("BLASWS_LOG_TRACE={}", cfg.trace_sink.as_deref().unwrap_or("off"));
    println!("BLASWS_LOG_BENCH={}", cfg.bench_sink.as_deref().unwrap_or("off"));
    println!("BLASWS_LOG_PROFILE={}", cfg.profile_sink.as_deref().unwrap_or("off"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_LOG_PATH;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_validate_clean_env() {
        assert!(validate(|_| None).is_empty());
        assert!(validate(lookup(&[(ENV_DEVICE_MEMORY_SIZE, "0x200000"), (ENV_LAYER, "7")])).is_empty());
    }

    #[test]
    fn test_validate_flags_bad_numbers() {
        let w = validate(lookup(&[(ENV_DEVICE_MEMORY_SIZE, "lots"), (ENV_LAYER, "x")]));
        assert_eq!(w.len(), 2);
        assert!(w[0].contains(ENV_DEVICE_MEMORY_SIZE));
        assert!(w[1].contains(ENV_LAYER));
    }

    #[test]
    fn test_validate_flags_unknown_layer_bits() {
        let w = validate(lookup(&[(ENV_LAYER, "9")]));
        assert_eq!(w.len(), 1);
        assert!(w[0].contains("unknown bits"));
    }

    #[test]
    fn test_validate_flags_legacy_variable() {
        let w = validate(lookup(&[(ENV_LEGACY_DEVICE_MEMORY_SIZE, "4096")]));
        assert_eq!(w.len(), 1);
        assert!(w[0].contains("obsolete"));
        assert!(validate(lookup(&[
            (ENV_LEGACY_DEVICE_MEMORY_SIZE, "4096"),
            (ENV_DEVICE_MEMORY_SIZE, "4096"),
        ]))
        .is_empty());
    }

    #[test]
    fn test_validate_flags_missing_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope").join("all.log");
        let ok = dir.path().join("all.log");
        let w = validate(lookup(&[(ENV_LAYER, "1"), (ENV_LOG_PATH, missing.to_str().unwrap())]));
        assert_eq!(w.len(), 1);
        assert!(validate(lookup(&[(ENV_LAYER, "1"), (ENV_LOG_PATH, ok.to_str().unwrap())])).is_empty());
    }

    #[test]
    fn test_print_config_smoke() {
        print_config(&WorkspaceConfig::default().effective_config());
    }
}
