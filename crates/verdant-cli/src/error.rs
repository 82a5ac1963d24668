//! Error types for the `verdant` binary.
//!
//! [`CliError`] wraps every failure a command can hit so `main` can
//! propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the `verdant` binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: verdant_core::ConfigError,
    },

    /// A toolkit operation failed.
    #[error("{source}")]
    Toolkit {
        /// The underlying toolkit error.
        #[from]
        source: verdant_core::ToolkitError,
    },

    /// Input rejected by the estimator.
    #[error("estimate error: {source}")]
    Estimate {
        /// The underlying estimator error.
        #[from]
        source: verdant_estimator::EstimateError,
    },

    /// Input rejected by the offset marketplace.
    #[error("offset error: {source}")]
    Offset {
        /// The underlying marketplace error.
        #[from]
        source: verdant_offsets::OffsetError,
    },

    /// The aggregator could not answer.
    #[error("aggregator error: {source}")]
    Aggregator {
        /// The underlying aggregator error.
        #[from]
        source: verdant_aggregator::AggregatorError,
    },

    /// A sessions file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// JSON input or output failed.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// A command-line value is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
