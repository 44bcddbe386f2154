//! Error types for the simulator

use thiserror::Error;

/// Top-level error type for simulator operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Input error: {0}")]
    Load(#[from] LoadError),

    #[error("Invalid request {id}: {reason}")]
    InvalidRequest { id: String, reason: String },

    /// Simulated time stopped advancing while work was still outstanding.
    #[error(
        "Simulation stalled at t={time}: {pending} pending, {queued} queued, {in_service} in service"
    )]
    Stalled {
        time: f64,
        pending: usize,
        queued: usize,
        in_service: usize,
    },
}

/// Errors raised while reading request records from a delimited file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Line {line}: invalid {column} value '{value}'")]
    InvalidField {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("Line {line}: row has {found} fields, header has {expected}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: quoted field is never closed")]
    UnterminatedQuote { line: usize },

    #[error("request_time mixes plain seconds and timestamps")]
    MixedTimestamps,
}
