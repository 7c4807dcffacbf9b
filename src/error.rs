//! Crate-level error types.
//!
//! Only configuration handling returns `Result` — the calculation engine
//! itself is total and reports clinical problems through the error list
//! on its result (see `engine`).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read protocol file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse protocol file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid protocol configuration: {0}")]
    Invalid(String),
}
