//! Error type for the Climatiq client.
//!
//! # Design
//! Transport failures, non-2xx statuses and malformed payloads all surface as
//! one `ApiError`. Each variant carries a best-effort message so callers that
//! do not care about the cause can show `message()` and move on. The type is
//! `Clone` because `ClimatiqSession` keeps a copy of the last failure while
//! handing the original back to the caller.

use thiserror::Error;

/// Message used when a failed response carries no `message` field.
pub const FALLBACK_MESSAGE: &str = "API request failed";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The upstream answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Required configuration is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// The human-readable message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Http { message, .. } => message,
            ApiError::Transport(msg)
            | ApiError::Deserialization(msg)
            | ApiError::Serialization(msg)
            | ApiError::Config(msg) => msg,
        }
    }

    /// HTTP status of an upstream rejection, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
