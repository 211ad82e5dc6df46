//! Credential bundles and their persisted form.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Token type assumed when the server or the stored record omits one.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

/// Credentials as issued by the login, registration and refresh endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    /// Opaque bearer token.
    pub access_token: String,
    /// Opaque token used to obtain the next bundle.
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: u64,
    /// Authorization scheme, usually "Bearer".
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

impl TokenBundle {
    /// Creates a bearer bundle.
    #[must_use]
    pub fn bearer(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: u64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_in,
            token_type: default_token_type(),
        }
    }
}

/// A stored credential bundle with its absolute expiry.
///
/// `expires_at` is always computed locally from the capture time and the
/// issued lifetime; it is persisted as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Opaque bearer token.
    pub access_token: String,
    /// Opaque refresh token.
    pub refresh_token: String,
    /// Authorization scheme.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds as issued by the server.
    pub expires_in: u64,
    /// Absolute expiry.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Captures a bundle at `now`, deriving its absolute expiry.
    #[must_use]
    pub fn issue(bundle: TokenBundle, now: DateTime<Utc>) -> Self {
        let lifetime = i64::try_from(bundle.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        let expires_at = now
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            access_token: bundle.access_token,
            refresh_token: bundle.refresh_token,
            token_type: bundle.token_type,
            expires_in: bundle.expires_in,
            expires_at,
        }
    }

    /// Time left until expiry; negative once expired.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        self.expires_at - now
    }

    /// True when less than `window` is left before expiry.
    #[must_use]
    pub fn is_expiring_within(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        self.remaining(now) < window
    }

    /// True once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The token type, falling back to "Bearer" when empty.
    #[must_use]
    pub fn token_type(&self) -> &str {
        if self.token_type.trim().is_empty() {
            DEFAULT_TOKEN_TYPE
        } else {
            &self.token_type
        }
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type(), self.access_token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_issue_derives_expiry_from_lifetime() {
        let record = TokenRecord::issue(TokenBundle::bearer("A", "R", 3600), at(1_000));
        assert_eq!(record.expires_at, at(1_000 + 3_600_000));
        assert_eq!(record.expires_in, 3600);
    }

    #[test]
    fn test_expiring_window_boundary() {
        let record = TokenRecord::issue(TokenBundle::bearer("A", "R", 3600), at(0));
        let window = TimeDelta::minutes(5);

        // exactly five minutes left is not "soon"
        assert!(!record.is_expiring_within(at(3_600_000 - 300_000), window));
        assert!(record.is_expiring_within(at(3_600_000 - 299_999), window));
    }

    #[test]
    fn test_is_expired_at_expiry_instant() {
        let record = TokenRecord::issue(TokenBundle::bearer("A", "R", 60), at(0));
        assert!(!record.is_expired(at(59_999)));
        assert!(record.is_expired(at(60_000)));
    }

    #[test]
    fn test_authorization_header_defaults_scheme() {
        let mut record = TokenRecord::issue(TokenBundle::bearer("A", "R", 60), at(0));
        assert_eq!(record.authorization_header(), "Bearer A");

        record.token_type = String::new();
        assert_eq!(record.authorization_header(), "Bearer A");

        record.token_type = "MAC".to_string();
        assert_eq!(record.authorization_header(), "MAC A");
    }

    #[test]
    fn test_record_serializes_expiry_as_millis() {
        let record = TokenRecord::issue(TokenBundle::bearer("A", "R", 1), at(5_000));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["expires_at"], 6_000);

        let back: TokenRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_bundle_without_token_type_defaults_to_bearer() {
        let bundle: TokenBundle = serde_json::from_str(
            r#"{"access_token":"a","refresh_token":"r","expires_in":10}"#,
        )
        .unwrap();
        assert_eq!(bundle.token_type, "Bearer");
    }

    #[test]
    fn test_huge_lifetime_saturates() {
        let record = TokenRecord::issue(TokenBundle::bearer("A", "R", u64::MAX), at(0));
        assert!(!record.is_expired(Utc::now()));
    }
}
