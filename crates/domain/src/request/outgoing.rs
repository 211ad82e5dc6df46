//! Fully resolved request handed to the transport.

use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use super::HttpMethod;

/// A request ready to be put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    /// Correlation id, also sent as `X-Request-Id`.
    pub request_id: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL including query string.
    pub url: Url,
    /// Headers to send.
    pub headers: BTreeMap<String, String>,
    /// Serialized JSON body.
    pub body: Option<String>,
    /// Abort threshold for the whole exchange.
    pub timeout: Duration,
}

impl OutgoingRequest {
    /// Looks up a header case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `Authorization` header, if attached.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.header("authorization")
    }
}
