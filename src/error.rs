//! Library-facing error types. `anyhow` is reserved for the binary
//! boundary (`main.rs`, `commands/`); everything importable from this
//! crate returns one of these.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open candle file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed candle row in {path} at line {line}: {source}")]
    Row {
        path: String,
        line: usize,
        #[source]
        source: csv::Error,
    },
    #[error("could not parse timestamp {raw:?} in {path}")]
    Timestamp { path: String, raw: String },
    #[error("{path} contains no candles")]
    Empty { path: String },
}
