//! Application error types

use linkhub_domain::{DomainError, Rejection};
use thiserror::Error;

use crate::ports::TransportError;

/// Why a token refresh did not produce a new access token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// No refresh token is stored.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The refresh call failed; displays the underlying message.
    #[error("{0}")]
    Failed(Box<ApiError>),

    /// The refresh was dropped before it settled.
    #[error("token refresh was abandoned")]
    Abandoned,
}

/// Errors surfaced by [`crate::ApiClient`] and the services built on it.
///
/// `Clone` so a single refresh outcome can be handed to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Application error code, if the body carried one.
        code: Option<String>,
        /// Server message, or `HTTP <status>`.
        message: String,
    },

    /// The session could not be renewed; the user must log in again.
    #[error(transparent)]
    Refresh(RefreshError),

    /// A 2xx response whose envelope reported `success: false`.
    #[error("{message}")]
    Rejected {
        /// Application error code, if any.
        code: Option<String>,
        /// Server message.
        message: String,
    },

    /// The body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// True when the caller should send the user back to the login entry point.
    ///
    /// An abandoned refresh says nothing about the stored session, so it
    /// does not count.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(
            self,
            Self::Refresh(RefreshError::NoRefreshToken | RefreshError::Failed(_))
        )
    }

    /// The HTTP status, for [`ApiError::Http`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The application error code, when the server sent one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Http { code, .. } | Self::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<RefreshError> for ApiError {
    fn from(error: RefreshError) -> Self {
        Self::Refresh(error)
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self::InvalidRequest(error.to_string())
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout { timeout_ms } => Self::Timeout { timeout_ms },
            TransportError::Network(message) => Self::Network(message),
            TransportError::InvalidRequest(message) => Self::InvalidRequest(message),
        }
    }
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected {
            code: rejection.code,
            message: rejection.message,
        }
    }
}

/// Result type alias for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_refresh_failure_displays_inner_message() {
        let error = ApiError::Refresh(RefreshError::Failed(Box::new(ApiError::Http {
            status: 401,
            code: Some("INVALID_REFRESH_TOKEN".into()),
            message: "refresh token revoked".into(),
        })));
        assert_eq!(error.to_string(), "refresh token revoked");
        assert!(error.is_session_expired());
    }

    #[test]
    fn test_abandoned_refresh_is_not_session_expiry() {
        assert!(ApiError::Refresh(RefreshError::NoRefreshToken).is_session_expired());
        assert!(!ApiError::Refresh(RefreshError::Abandoned).is_session_expired());
    }

    #[test]
    fn test_timeout_message() {
        let error = ApiError::from(TransportError::Timeout { timeout_ms: 10_000 });
        assert_eq!(error.to_string(), "request timed out after 10000 ms");
        assert!(!error.is_session_expired());
    }
}
