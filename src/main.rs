//! CLI harness: run one calculation from a JSON input file.
//!
//! Usage: `dkacalc <input.json> [--config <protocol.json>]`
//!
//! Prints the result tree as pretty JSON on stdout. Exits non-zero when
//! the pass produced errors — by contract those values must not be used.

use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use dkacalc::{calculate, ClinicalInput, ProtocolConfig};

fn usage() -> ExitCode {
    eprintln!("Usage: dkacalc <input.json> [--config <protocol.json>]");
    ExitCode::from(2)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input_path, config_path) = match args.as_slice() {
        [input] => (input.clone(), None),
        [input, flag, config] if flag == "--config" => (input.clone(), Some(config.clone())),
        _ => return usage(),
    };

    let config = match config_path {
        Some(path) => match ProtocolConfig::from_json_file(Path::new(&path)) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::from(2);
            }
        },
        None => ProtocolConfig::default(),
    };

    let raw = match std::fs::read_to_string(&input_path) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("Failed to read {input_path}: {err}");
            return ExitCode::from(2);
        }
    };
    let input: ClinicalInput = match serde_json::from_str(&raw) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("Failed to parse clinical input: {err}");
            return ExitCode::from(2);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dkacalc starting");

    let result = calculate(&config, &input);

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("Failed to serialise result: {err}");
            return ExitCode::from(2);
        }
    }

    if result.is_usable() {
        ExitCode::SUCCESS
    } else {
        for message in &result.errors {
            eprintln!("error: {message}");
        }
        ExitCode::FAILURE
    }
}
