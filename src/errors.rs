/*!
 * Error types for the locfill application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when calling the translation API
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when sending the request itself fails (network, DNS, timeout)
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error body returned by the API
        message: String,
    },

    /// The API answered 2xx but the translations array was empty or missing
    #[error("No translations returned for a batch of {expected} texts")]
    NoTranslations {
        /// Number of texts that were sent
        expected: usize,
    },

    /// The API returned a different number of translations than texts sent
    #[error("Translation count mismatch: sent {sent}, received {received}")]
    CountMismatch {
        /// Number of texts sent
        sent: usize,
        /// Number of translations received
        received: usize,
    },
}

impl ProviderError {
    /// Whether this failure is worth retrying with backoff.
    ///
    /// Server errors, rate limiting and network failures are transient;
    /// any other client error fails fast.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500 || *status_code == 429,
            Self::ParseError(_) | Self::NoTranslations { .. } | Self::CountMismatch { .. } => false,
        }
    }
}

/// Errors that can occur while running the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input entity file could not be read or parsed
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A progress or result file could not be read or written
    #[error("Checkpoint I/O error: {0}")]
    CheckpointIo(String),

    /// Error from the translation provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the translation provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
