//! Unified application error types for ResDao.
//!
//! Every crate maps its internal errors into [`AppError`] so that they
//! propagate through the `?` operator with a stable [`ErrorKind`].

use std::fmt;
use thiserror::Error;

/// Error category shared by every layer of the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input parameters are malformed (bad id, bad page link, invalid entity).
    Validation,
    /// The identifier does not resolve to an entity.
    NotFound,
    /// A write collided with an existing entity's natural key.
    Conflict,
    /// The backing store is unreachable or failed to answer.
    StoreUnavailable,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::StoreUnavailable => write!(f, "STORE_UNAVAILABLE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout ResDao.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a store-unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreUnavailable, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        Self::with_source(
            ErrorKind::Validation,
            format!("Malformed identifier: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::not_found("Resource abc not found");
        assert_eq!(err.to_string(), "NOT_FOUND: Resource abc not found");
    }

    #[test]
    fn test_uuid_error_is_validation() {
        let err: AppError = uuid::Uuid::parse_str("not-a-uuid").unwrap_err().into();
        assert!(err.is(ErrorKind::Validation));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_error_is_configuration() {
        let err: AppError = config::ConfigError::Message("missing field `url`".into()).into();
        assert!(err.is(ErrorKind::Configuration));
        assert!(err.message.contains("missing field `url`"));
    }

    #[test]
    fn test_clone_drops_source() {
        let err: AppError = uuid::Uuid::parse_str("zz").unwrap_err().into();
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Validation);
        assert!(cloned.source.is_none());
    }
}
