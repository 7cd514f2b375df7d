//! # Spark Host Daemon
//!
//! Main entry point for the Spark host runtime.

use sparkd::{HostRuntime, HostRuntimeConfig};
use std::env;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("sparkd");

    let config = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(program);
        process::exit(1);
    });

    let runtime = HostRuntime::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to create runtime: {}", e);
        process::exit(1);
    });

    match runtime.run() {
        Ok(report) => {
            println!(
                "{} round trips in {} ticks ({:?})",
                report.rounds, report.elapsed_ticks, report.elapsed
            );
            println!(
                "logger: {} lines, {} snapshots, {} ignored",
                report.logger.lines, report.logger.snapshots, report.logger.ignored
            );
            println!("shared region seq: {}", report.shared_seq);
        }
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            process::exit(1);
        }
    }
}

fn parse_args(args: &[String]) -> Result<HostRuntimeConfig, String> {
    let mut config = HostRuntimeConfig::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --config".to_string());
                }
                config = config
                    .with_kernel_config_file(Path::new(&args[i]))
                    .map_err(|e| e.to_string())?;
            }
            "--rounds" | "-r" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --rounds".to_string());
                }
                config.rounds = args[i]
                    .parse()
                    .map_err(|_| format!("Invalid rounds value: {}", args[i]))?;
            }
            "--help" | "-h" => {
                print_usage(args.first().map(String::as_str).unwrap_or("sparkd"));
                process::exit(0);
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    Ok(config)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <FILE>      Kernel config (JSON)");
    eprintln!("  -r, --rounds <N>         Ping/pong round trips (default 16)");
    eprintln!("  -h, --help               Show this help message");
    eprintln!();
    eprintln!("Set RUST_LOG=debug to see task log lines.");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --rounds 100", program);
    eprintln!("  RUST_LOG=info {} --config kernel.json", program);
}
