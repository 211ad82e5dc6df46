//! Logical API request.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::HttpMethod;
use crate::error::{DomainError, DomainResult};

/// Endpoints reachable without credentials, relative to the API root.
const PUBLIC_AUTH_ENDPOINTS: &[&str] = &[
    "auth/login",
    "auth/register",
    "auth/refresh",
    "auth/phone/login",
    "auth/send-code",
    "auth/reset-password",
];

/// A call against the dashboard API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to `/api/{version}/`, e.g. `protected/groups/3`.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Extra headers; these override the defaults.
    pub headers: BTreeMap<String, String>,
    /// JSON body, ignored for GET.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Creates a request with no query, headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Serializes `body` as the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidBody`] if `body` cannot be represented as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> DomainResult<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Appends one query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Appends several query parameters.
    #[must_use]
    pub fn queries<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets an extra header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// The path without leading or trailing slashes.
    #[must_use]
    pub fn normalized_path(&self) -> &str {
        self.path.trim_matches('/')
    }

    /// True for the auth endpoints that must be called without credentials
    /// and must never trigger a token refresh (login, register, refresh...).
    #[must_use]
    pub fn is_public_auth_endpoint(&self) -> bool {
        let path = self.normalized_path();
        let path = path.split('?').next().unwrap_or(path);
        PUBLIC_AUTH_ENDPOINTS.contains(&path)
    }

    /// The body to send, if any. GET requests never carry one.
    #[must_use]
    pub fn body_to_send(&self) -> Option<&Value> {
        if self.method.sends_body() {
            self.body.as_ref()
        } else {
            None
        }
    }
}
