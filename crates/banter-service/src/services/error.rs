//! Service layer error types
//!
//! Domain errors pass through so their wire codes survive to the session
//! boundary; infrastructure failures collapse into the transport buckets.

use banter_cache::{BackplaneError, CacheError};
use banter_common::AppError;
use banter_core::DomainError;

/// Service layer error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Backplane error: {0}")]
    Backplane(#[from] BackplaneError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error code for wire responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Cache(_) => "CACHE_ERROR",
            Self::Backplane(_) => "TRANSPORT_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Caller mistakes; never retried
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Domain(e) => {
                e.is_not_found() || e.is_unauthorized() || e.is_invariant_violation()
            }
            Self::Validation(_) => true,
            _ => false,
        }
    }

    /// The caller may retry the whole operation once
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_conflict())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::Cache(e) => AppError::Cache(e.to_string()),
            ServiceError::Backplane(e) => AppError::Transport(e.to_string()),
            ServiceError::Validation(msg) => {
                AppError::Internal(anyhow::anyhow!("validation: {msg}"))
            }
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
