//! Error types for Ledger Core
//!
//! Covers:
//! - Parsing of scopes, categories and period statuses
//! - Reporting-period workflow violations
//! - Configuration loading

use crate::types::PeriodStatus;
use std::path::PathBuf;

/// Main core error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Scope outside 1..=3
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    /// Unparseable period status
    #[error("invalid period status: {0}")]
    InvalidPeriodStatus(String),

    /// Reporting-period workflow violation
    #[error("state machine error: {0}")]
    StateMachine(#[from] StateMachineError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Reporting-period status transition errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateMachineError {
    /// Transition not in the allowed table
    #[error("illegal period transition: {from} -> {to}")]
    IllegalTransition {
        /// Current status
        from: PeriodStatus,
        /// Requested status
        to: PeriodStatus,
    },

    /// Period is locked and cannot change
    #[error("period is locked")]
    Locked,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or shape error
    #[error("invalid config: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// Semantically invalid value
    #[error("invalid value for `{key}`: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid-value error
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_transition_display() {
        let err = StateMachineError::IllegalTransition {
            from: PeriodStatus::Draft,
            to: PeriodStatus::Locked,
        };
        assert_eq!(err.to_string(), "illegal period transition: draft -> locked");
    }

    #[test]
    fn core_error_wraps_state_machine() {
        let err: CoreError = StateMachineError::Locked.into();
        assert!(err.to_string().contains("period is locked"));
    }
}
