//! Error taxonomy shared by the core services and the GraphQL layer
//!
//! Every failure is terminal for the operation that raised it. Ownership
//! violations are reported as [`ApiError::NotFound`] so callers cannot probe
//! for records they are not allowed to see.

use async_graphql::ErrorExtensions;

/// Result alias used across the service layer
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No credential was supplied on an operation that requires one
    #[error("Authentication required")]
    AuthenticationRequired,

    /// A credential was supplied but is malformed, tampered with or expired
    #[error("{0}")]
    AuthenticationFailed(String),

    /// The record does not exist or the caller may not see it
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("Operation failed")]
    Database(#[from] sqlx::Error),

    #[error("Operation failed")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }

    /// Stable machine-readable code reported in the GraphQL error extensions
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::AuthenticationRequired => "UNAUTHENTICATED",
            ApiError::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ValidationFailed(_) => "BAD_USER_INPUT",
            ApiError::Database(_) | ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        match self {
            ApiError::Database(e) => tracing::error!(error = %e, "Store operation failed"),
            ApiError::Internal(e) => tracing::error!(error = %e, "Internal error"),
            _ => {}
        }

        let code = self.code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

/// Converts service results into GraphQL results while keeping the error code
pub trait IntoGraphql<T> {
    fn into_gql(self) -> async_graphql::Result<T>;
}

impl<T> IntoGraphql<T> for ApiResult<T> {
    fn into_gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.extend())
    }
}
