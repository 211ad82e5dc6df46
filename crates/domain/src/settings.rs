//! Client configuration.

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Settings for the API client.
///
/// Every field has a default, so partial sources (a config file with only
/// `base_url`, a single environment variable) are valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server origin, e.g. `https://api.example.com`.
    pub base_url: String,
    /// API version segment, e.g. `v1` for `/api/v1/...`.
    pub api_version: String,
    /// Per-request abort threshold in milliseconds.
    pub timeout_ms: u64,
    /// Verbose request logging.
    pub debug: bool,
    /// Storage key of the serialized token record.
    pub token_storage_key: String,
    /// Refresh proactively when less than this many seconds remain.
    pub refresh_window_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_version: "v1".to_string(),
            timeout_ms: 10_000,
            debug: false,
            token_storage_key: "token_data".to_string(),
            refresh_window_secs: 300,
        }
    }
}

impl ClientConfig {
    /// Config pointing at `base_url` with every other field defaulted.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// The per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The proactive refresh window.
    #[must_use]
    pub fn refresh_window(&self) -> TimeDelta {
        i64::try_from(self.refresh_window_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// Resolves `path` against `{base_url}/api/{api_version}/` and appends `query`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] when the result is not a valid URL.
    pub fn endpoint_url(&self, path: &str, query: &[(String, String)]) -> DomainResult<Url> {
        let raw = format!(
            "{}/api/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version.trim_matches('/'),
            path.trim_start_matches('/'),
        );
        let mut url = Url::parse(&raw).map_err(|e| DomainError::InvalidUrl(format!("{e}: {raw}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Checks the values that cannot be caught by deserialization.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfig`] for a zero timeout, an empty
    /// storage key, or an unusable base URL.
    pub fn validate(&self) -> DomainResult<()> {
        if self.timeout_ms == 0 {
            return Err(DomainError::InvalidConfig("timeout_ms must be positive".into()));
        }
        if self.token_storage_key.trim().is_empty() {
            return Err(DomainError::InvalidConfig("token_storage_key must not be empty".into()));
        }
        let base = Url::parse(&self.base_url)
            .map_err(|e| DomainError::InvalidConfig(format!("base_url: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(DomainError::InvalidConfig(format!(
                "base_url: {} is not a base URL",
                self.base_url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_url_joins_segments() {
        let config = ClientConfig::with_base_url("https://api.example.com/");
        let url = config.endpoint_url("/protected/groups", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v1/protected/groups");
    }

    #[test]
    fn test_endpoint_url_encodes_query() {
        let config = ClientConfig::default();
        let url = config
            .endpoint_url(
                "protected/contents",
                &[("search".to_string(), "hot pot&more".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/v1/protected/contents?search=hot+pot%26more"
        );
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::default().validate().is_ok());

        let config = ClientConfig {
            timeout_ms: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());

        assert!(ClientConfig::with_base_url("mailto:x@y.z").validate().is_err());
        assert!(ClientConfig::with_base_url("not a url").validate().is_err());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"base_url": "https://x.io"}"#).unwrap();
        assert_eq!(config.base_url, "https://x.io");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.refresh_window(), TimeDelta::minutes(5));
    }
}
