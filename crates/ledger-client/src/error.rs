//! Error types for the Ledger client
//!
//! Covers:
//! - Transport failures (connection refused, timeouts)
//! - Non-success HTTP statuses with the backend's message
//! - Expired or missing sessions
//! - Session-store persistence

use std::path::PathBuf;

use ledger_core::{PeriodStatus, StateMachineError};

/// Result alias used throughout the client
pub type ApiResult<T> = Result<T, ApiError>;

/// Main client error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request never produced a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Session is missing or was rejected; the local token has been cleared
    #[error("not authenticated")]
    Unauthorized,

    /// Response body did not match the expected shape
    #[error("decode error: {0}")]
    Decode(String),

    /// Period no longer accepts activity changes
    #[error("period is {0} and does not accept edits")]
    PeriodClosed(PeriodStatus),

    /// Workflow transition rejected locally
    #[error("workflow error: {0}")]
    Workflow(#[from] StateMachineError),

    /// Session persistence failed
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Whether the request never got an answer and may be resent
    ///
    /// Backend statuses, 5xx included, are final. Resending is further
    /// limited to idempotent methods by the HTTP client.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP status, when the backend produced one
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Session-store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the session file failed
    #[error("session file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Session could not be serialized
    #[error("session encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// Create I/O error
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(ApiError::Transport("refused".into()).is_retryable());
        assert!(!ApiError::Status { status: 503, message: "busy".into() }.is_retryable());
        assert!(!ApiError::Status { status: 422, message: "bad".into() }.is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
    }

    #[test]
    fn status_is_exposed() {
        assert_eq!(ApiError::Unauthorized.status(), Some(401));
        assert_eq!(ApiError::Decode("x".into()).status(), None);
    }

    #[test]
    fn display_includes_backend_message() {
        let err = ApiError::Status {
            status: 409,
            message: "Period is locked".into(),
        };
        assert_eq!(err.to_string(), "request failed with status 409: Period is locked");
        assert_eq!(
            ApiError::PeriodClosed(PeriodStatus::Locked).to_string(),
            "period is locked and does not accept edits"
        );
    }
}
