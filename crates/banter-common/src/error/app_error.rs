//! Application error types
//!
//! The boundary error handed to presentation layers (the realtime session,
//! read-side queries). Domain errors pass through transparently so their
//! wire codes survive; infrastructure failures collapse into the
//! server-side buckets.

use banter_core::DomainError;
use serde::Serialize;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get the error code for wire responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Cache(_) => "CACHE_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Caller mistakes: bad input, missing resources, permission failures
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Domain(e) => {
                e.is_not_found() || e.is_unauthorized() || e.is_invariant_violation()
            }
            _ => false,
        }
    }

    /// Infrastructure failures the caller cannot fix
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_transport_failure(),
            Self::Cache(_) | Self::Transport(_) | Self::Config(_) | Self::Internal(_) => true,
        }
    }

    /// The caller may retry the whole operation once
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_conflict())
    }
}

/// Wire representation of a failure
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result alias for application-boundary functions
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_code_passes_through() {
        let err = AppError::from(DomainError::AlreadyDeleted);
        assert_eq!(err.error_code(), "ALREADY_DELETED");
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_conflict_is_retryable() {
        let err = AppError::from(DomainError::Conflict("message 1".to_string()));
        assert!(err.is_retryable());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_infrastructure_is_server_error() {
        let err = AppError::Transport("backplane closed".to_string());
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_response() {
        let err = AppError::from(DomainError::NotOwner);
        let resp = ErrorResponse::from(&err);
        assert_eq!(resp.code, "NOT_OWNER");
        assert_eq!(resp.message, "Not the message owner");
    }
}
