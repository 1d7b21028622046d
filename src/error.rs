//! Error types for trak_relay

use std::net::SocketAddr;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trak_relay error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Constructor or configuration argument out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Sample or point arity does not match the filter
    #[error("Dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch {
        /// Configured number of parameters
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// UDP socket could not be bound or configured
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address the bind was attempted on
        addr: SocketAddr,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Sample text that could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}
