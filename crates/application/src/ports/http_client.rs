//! HTTP transport port.

use std::future::Future;
use std::pin::Pin;

use linkhub_domain::{OutgoingRequest, RawResponse};
use thiserror::Error;

/// Transport-level failures. Anything with a status code is a response, not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The exchange did not finish within the request timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// Connection, TLS or body read failure.
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be put on the wire.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Boxed future returned by [`HttpClient::execute`].
pub type HttpFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + 'a>>;

/// Sends one fully resolved request.
///
/// Implementations must abort the exchange once `request.timeout` elapses
/// and report it as [`TransportError::Timeout`].
pub trait HttpClient: Send + Sync {
    /// Executes the request and returns the raw response, whatever its status.
    fn execute(&self, request: OutgoingRequest) -> HttpFuture<'_>;
}
