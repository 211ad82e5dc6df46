//! Raw HTTP responses and their decoded bodies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An HTTP response as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers with lower-cased names.
    pub headers: BTreeMap<String, String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response, lower-casing header names.
    #[must_use]
    pub fn new<I, K, V>(status: u16, headers: I, body: Vec<u8>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            status,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
            body,
        }
    }

    /// A JSON response with the given status.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(
            status,
            [("content-type", "application/json")],
            body.to_string().into_bytes(),
        )
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for 401 Unauthorized.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// The `Content-Type` header, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }

    /// True when the content type is `application/json` or a `+json` type.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type()
            .and_then(|ct| ct.parse::<mime::Mime>().ok())
            .is_some_and(|m| m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON))
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body according to the content type.
    ///
    /// JSON content with an empty body decodes to `null`; JSON content that
    /// fails to parse falls back to text.
    #[must_use]
    pub fn decode_body(&self) -> ResponseBody {
        if self.is_json() {
            if self.body.iter().all(u8::is_ascii_whitespace) {
                return ResponseBody::Json(Value::Null);
            }
            if let Ok(value) = serde_json::from_slice(&self.body) {
                return ResponseBody::Json(value);
            }
        }
        ResponseBody::Text(self.text())
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Parsed JSON document.
    Json(Value),
    /// Anything that was not JSON.
    Text(String),
}

impl ResponseBody {
    /// The JSON value, if this body is JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Extracts a human-readable error message from an error body.
    ///
    /// Looks at `error.message`, then a string `error`, then `message`.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        let value = self.as_json()?;
        value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .or_else(|| value.get("error").and_then(Value::as_str))
            .or_else(|| value.get("message").and_then(Value::as_str))
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    /// Extracts an application error code from an error body.
    ///
    /// Looks at `error.code`, then `code`; numbers are rendered as strings.
    #[must_use]
    pub fn server_code(&self) -> Option<String> {
        let value = self.as_json()?;
        value
            .pointer("/error/code")
            .or_else(|| value.get("code"))
            .and_then(code_to_string)
    }
}

pub(crate) fn code_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
