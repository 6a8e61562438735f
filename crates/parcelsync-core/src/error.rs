use thiserror::Error;

use crate::sink::SinkError;

/// Configuration and bookmark validation errors.
///
/// All of these are raised before any request is issued.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api_key is required and cannot be empty")]
    MissingApiKey,
    #[error("api_version cannot be empty")]
    EmptyApiVersion,
    #[error("start_date must be an ISO-8601 datetime with offset: '{value}'")]
    InvalidStartDate { value: String },
    #[error("stored bookmark is not an ISO-8601 datetime with offset: '{value}'")]
    InvalidBookmark { value: String },
    #[error("timestamp must be ISO-8601 with offset: '{value}'")]
    InvalidTimestamp { value: String },
}

/// Top-level error type for an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Client error (4xx other than 429). Never retried.
    #[error("{status} Client Error: {reason} for path: {path}")]
    Fatal {
        status: u16,
        reason: String,
        path: String,
    },

    /// Transport failure that cannot be retried.
    #[error("transport failure for path: {path}: {message}")]
    Transport { path: String, message: String },

    /// The per-request attempt ceiling was reached on a retryable failure.
    #[error("retry budget exhausted after {attempts} attempts for path: {path} (last: {last})")]
    RetriesExhausted {
        attempts: u32,
        path: String,
        last: String,
    },

    /// The response body could not be parsed as the expected JSON envelope.
    #[error("malformed response envelope for path: {path}: {message}")]
    Envelope { path: String, message: String },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl ExtractError {
    /// True when a restarted run would resume from the persisted bookmark
    /// rather than hit the same failure deterministically.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}
