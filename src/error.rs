//! Error types for the workforce statistics engine.
//!
//! The computations themselves are total: missing or malformed schedule data
//! degrades to zero-valued rows. Errors only surface at the boundaries, when
//! configuration is loaded, when period keys or schedule documents are parsed,
//! and when an asynchronous period fetch fails.

use thiserror::Error;

/// The main error type for the statistics engine.
///
/// # Example
///
/// ```
/// use workforce_stats::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value is outside its allowed range.
    #[error("Invalid setting '{field}': {message}")]
    InvalidSettings {
        /// The offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A period key was not of the form `YYYY-MM`.
    #[error("Invalid period key '{value}': expected YYYY-MM")]
    InvalidPeriodKey {
        /// The rejected input.
        value: String,
    },

    /// A schedule document did not have the expected shape.
    #[error("Invalid schedule document: {message}")]
    InvalidScheduleDocument {
        /// A description of the problem.
        message: String,
    },

    /// An asynchronous fetch behind the period cache failed.
    #[error("Fetch for '{key}' failed: {message}")]
    FetchFailed {
        /// The cache key being fetched.
        key: String,
        /// The loader's error message.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
