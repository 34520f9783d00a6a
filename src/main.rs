//! blas-workspace command-line tool.
//!
//! ## CLI Subcommands
//!
//! - `blasws-cli config [show|defaults|validate] [--json]` - Inspect configuration
//! - `blasws-cli probe <size>...` - Size query + resize on the simulated device
//! - `blasws-cli version` / `help`

use std::process::ExitCode;

use blas_workspace::cli::{config_cmd, run_probe};
use blas_workspace::telemetry::{init_logging, LogConfig, LogFormat};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    let log_config = LogConfig {
        format: if args.iter().any(|a| a == "--log-json") { LogFormat::Json } else { LogFormat::Pretty },
        level: std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        output_path: None,
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Logging disabled: {e}");
    }

    match command {
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" | "--json" => {
                    let json = args.iter().skip(2).any(|a| a == "--json");
                    ExitCode::from(config_cmd::run_show(json) as u8)
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => ExitCode::from(config_cmd::run_validate() as u8),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_usage();
                    ExitCode::FAILURE
                }
            }
        }
        "probe" => {
            let sizes: Vec<String> =
                args.iter().skip(2).filter(|a| !a.starts_with("--")).cloned().collect();
            ExitCode::from(run_probe(&sizes) as u8)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("blasws-cli {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "blasws-cli v{}

USAGE:
    blasws-cli <COMMAND> [OPTIONS]

COMMANDS:
    config show [--json]   Print effective configuration
    config defaults        Print default values
    config validate        Check environment values (exit 1 on warnings)
    probe <size>...        Run a size query over the given sizes and resize
    version                Show version information
    help                   Show this help message

OPTIONS:
    --log-json     Emit diagnostics as JSON

ENVIRONMENT:
    BLASWS_DEVICE_MEMORY_SIZE  Initial arena size in bytes (default 1048576)
    BLASWS_LAYER               Layer bitmask: 1 trace, 2 bench, 4 profile
    BLASWS_LOG_TRACE_PATH      Trace log file
    BLASWS_LOG_BENCH_PATH      Bench log file
    BLASWS_LOG_PROFILE_PATH    Profile log file
    BLASWS_LOG_PATH            Shared log file for sinks without their own
    RUST_LOG                   Diagnostic filter (default warn)

EXIT CODES:
    0  Success
    1  Failure / warnings
    2  Usage error
",
        version
    );
}
