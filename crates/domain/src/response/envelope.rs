//! The backend's `{success, data, message | error, code}` envelope.
//!
//! Different endpoints wrap their payloads inconsistently: errors come as a
//! bare string or as `{code, message}`, codes come as strings or numbers,
//! and some endpoints return the payload without any wrapper. Everything is
//! normalized here so callers only ever see `Result<Option<T>, Rejection>`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::raw::code_to_string;

/// Error member of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvelopeError {
    /// `"error": "message"`
    Message(String),
    /// `"error": {"code": ..., "message": ...}`
    Detailed {
        /// Application error code, string or number.
        #[serde(default)]
        code: Option<Value>,
        /// Human-readable message.
        #[serde(default)]
        message: Option<String>,
    },
}

/// A normalized response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the server reports success.
    pub success: bool,
    /// Payload.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Informational or error message.
    #[serde(default)]
    pub message: Option<String>,
    /// Error details.
    #[serde(default)]
    pub error: Option<EnvelopeError>,
    /// Top-level error code.
    #[serde(default)]
    pub code: Option<Value>,
    /// Server timestamp.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Server-side request id.
    #[serde(default)]
    pub request_id: Option<String>,
}

/// A `success: false` envelope, reduced to what callers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Application error code, if the server sent one.
    pub code: Option<String>,
    /// Message to show the user.
    pub message: String,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Interprets a JSON document as an envelope.
    ///
    /// Objects carrying a `success` key are read as envelopes; anything else
    /// (bare arrays, bare objects, `null`) is taken to be the payload itself.
    ///
    /// # Errors
    ///
    /// Returns an error when the document matches neither shape.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let wrapped = value
            .as_object()
            .is_some_and(|object| object.contains_key("success"));

        if wrapped {
            serde_json::from_value(value)
        } else {
            Ok(Self::success(serde_json::from_value(value)?))
        }
    }
}

impl<T> Envelope<T> {
    /// A successful envelope around `data`.
    #[must_use]
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            code: None,
            timestamp: None,
            request_id: None,
        }
    }

    /// The error message: `error.message`, then `error`, then `message`.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        let nested = match &self.error {
            Some(EnvelopeError::Message(message)) => Some(message.as_str()),
            Some(EnvelopeError::Detailed {
                message: Some(message),
                ..
            }) => Some(message.as_str()),
            _ => None,
        };
        nested
            .filter(|m| !m.is_empty())
            .or_else(|| self.message.as_deref().filter(|m| !m.is_empty()))
    }

    /// The error code: `error.code`, then `code`.
    #[must_use]
    pub fn error_code(&self) -> Option<String> {
        let nested = match &self.error {
            Some(EnvelopeError::Detailed {
                code: Some(code), ..
            }) => code_to_string(code),
            _ => None,
        };
        nested.or_else(|| self.code.as_ref().and_then(code_to_string))
    }

    /// Splits the envelope into its payload or a rejection.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] when `success` is false.
    pub fn into_result(self) -> Result<Option<T>, Rejection> {
        if self.success {
            return Ok(self.data);
        }
        Err(Rejection {
            code: self.error_code(),
            message: self
                .error_message()
                .unwrap_or("request was not successful")
                .to_string(),
        })
    }
}
