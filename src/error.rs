//! Error types.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// A fatal problem with the simulation configuration.
///
/// Every variant is detected before any worker starts: a run either begins
/// with a fully valid configuration or not at all. Nothing here is
/// recoverable or retried.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("unable to read configuration file: {0}")]
    Io(#[from] io::Error),

    /// The configuration file is not valid JSON or is missing required
    /// fields.
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A `[min, max]` range where `max < min`.
    #[error("invalid range for {field}: max ({max:?}) is less than min ({min:?})")]
    InvertedRange {
        /// The configuration entry holding the range.
        field: String,
        /// The configured lower bound.
        min: Duration,
        /// The configured upper bound.
        max: Duration,
    },

    /// A count that must be positive is zero.
    #[error("{field} must be greater than zero")]
    ZeroCount {
        /// The configuration entry holding the count.
        field: String,
    },

    /// No station kind has any servers while cars are still configured to
    /// arrive, so every car would queue forever.
    #[error("no station has any servers: arriving cars could never be served")]
    NoStationServers,
}
