//! Persistent token storage with expiry tracking.
//!
//! Tokens live in a [`KeyValueStore`] under three keys: the raw access
//! token, the raw refresh token and the JSON [`TokenRecord`]. All three are
//! written in one batch and every read or write is serialized by an async
//! read-write lock, so readers never observe a half-written bundle.

use std::sync::Arc;

use chrono::TimeDelta;
use linkhub_domain::{ClientConfig, DEFAULT_TOKEN_TYPE, TokenBundle, TokenRecord};
use tokio::sync::RwLock;
use tracing::warn;

use crate::ports::{Clock, KeyValueStore};

/// Storage keys used by the token store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenKeys {
    /// Raw access token.
    pub access_token: String,
    /// Raw refresh token.
    pub refresh_token: String,
    /// Serialized [`TokenRecord`].
    pub record: String,
    /// Single-token key written by older clients. Only ever removed.
    pub legacy: String,
}

impl Default for TokenKeys {
    fn default() -> Self {
        Self {
            access_token: "access_token".to_string(),
            refresh_token: "refresh_token".to_string(),
            record: "token_data".to_string(),
            legacy: "auth-token".to_string(),
        }
    }
}

impl TokenKeys {
    /// Default keys with a custom record key.
    #[must_use]
    pub fn with_record_key(record: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            ..Self::default()
        }
    }

    fn all(&self) -> [&str; 4] {
        [
            self.access_token.as_str(),
            self.refresh_token.as_str(),
            self.record.as_str(),
            self.legacy.as_str(),
        ]
    }
}

/// Durable store for the session's credentials.
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    keys: TokenKeys,
    /// Tokens with less than this left are refreshed proactively.
    refresh_window: TimeDelta,
    lock: RwLock<()>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("keys", &self.keys)
            .field("refresh_window", &self.refresh_window)
            .finish_non_exhaustive()
    }
}

impl TokenStore {
    /// Creates a store with the default keys and a five minute refresh window.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            keys: TokenKeys::default(),
            refresh_window: TimeDelta::minutes(5),
            lock: RwLock::new(()),
        }
    }

    /// Creates a store using the record key and refresh window from `config`.
    #[must_use]
    pub fn from_config(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: &ClientConfig,
    ) -> Self {
        Self::new(storage, clock)
            .with_keys(TokenKeys::with_record_key(config.token_storage_key.clone()))
            .with_refresh_window(config.refresh_window())
    }

    /// Overrides the storage keys.
    #[must_use]
    pub fn with_keys(mut self, keys: TokenKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Overrides the refresh window.
    #[must_use]
    pub const fn with_refresh_window(mut self, window: TimeDelta) -> Self {
        self.refresh_window = window;
        self
    }

    /// The storage keys in use.
    #[must_use]
    pub const fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    /// Persists a freshly issued bundle, replacing any previous one.
    ///
    /// The expiry is computed from the clock at call time. A storage
    /// failure is logged and the store is left logged-out.
    pub async fn save_tokens(&self, bundle: &TokenBundle) {
        let record = TokenRecord::issue(bundle.clone(), self.clock.now());
        let serialized = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(error) => {
                warn!(%error, "failed to serialize token record");
                return;
            }
        };

        let _guard = self.lock.write().await;
        let entries = [
            (self.keys.access_token.as_str(), record.access_token.as_str()),
            (self.keys.refresh_token.as_str(), record.refresh_token.as_str()),
            (self.keys.record.as_str(), serialized.as_str()),
        ];
        if let Err(error) = self.storage.set_many(&entries).await {
            warn!(%error, "failed to persist tokens, session will be logged out");
            if let Err(error) = self.storage.remove_many(&self.keys.all()).await {
                warn!(%error, "failed to discard partially written tokens");
            }
        }
    }

    /// The stored access token.
    pub async fn access_token(&self) -> Option<String> {
        let _guard = self.lock.read().await;
        self.read_string(&self.keys.access_token).await
    }

    /// The stored refresh token.
    pub async fn refresh_token(&self) -> Option<String> {
        let _guard = self.lock.read().await;
        self.read_string(&self.keys.refresh_token).await
    }

    /// The full stored record. Absent or malformed records yield `None`.
    pub async fn token_data(&self) -> Option<TokenRecord> {
        let _guard = self.lock.read().await;
        self.read_record().await
    }

    /// True when no record exists or less than the refresh window remains.
    pub async fn is_token_expiring_soon(&self) -> bool {
        self.token_data()
            .await
            .is_none_or(|record| record.is_expiring_within(self.clock.now(), self.refresh_window))
    }

    /// True when no record exists or the expiry has passed.
    pub async fn is_token_expired(&self) -> bool {
        self.token_data()
            .await
            .is_none_or(|record| record.is_expired(self.clock.now()))
    }

    /// True when an access token is stored and has not expired.
    pub async fn is_logged_in(&self) -> bool {
        let _guard = self.lock.read().await;
        if self.read_string(&self.keys.access_token).await.is_none() {
            return false;
        }
        self.read_record()
            .await
            .is_some_and(|record| !record.is_expired(self.clock.now()))
    }

    /// Removes every persisted key, including the legacy one. Idempotent.
    pub async fn clear_tokens(&self) {
        let _guard = self.lock.write().await;
        if let Err(error) = self.storage.remove_many(&self.keys.all()).await {
            warn!(%error, "failed to clear stored tokens");
        }
    }

    /// `"<token_type> <access_token>"`, or `None` without an access token.
    pub async fn authorization_header(&self) -> Option<String> {
        let _guard = self.lock.read().await;
        let access_token = self.read_string(&self.keys.access_token).await?;
        let token_type = self
            .read_record()
            .await
            .map(|record| record.token_type().to_string())
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());
        Some(format!("{token_type} {access_token}"))
    }

    /// Summary of the stored credentials for display.
    pub async fn status(&self) -> TokenStatus {
        let _guard = self.lock.read().await;
        let Some(record) = self.read_record().await else {
            return TokenStatus::NotAuthenticated;
        };
        let can_refresh = !record.refresh_token.is_empty();
        let now = self.clock.now();
        let seconds_remaining = record.remaining(now).num_seconds();

        if record.is_expired(now) {
            TokenStatus::Expired { can_refresh }
        } else if record.is_expiring_within(now, self.refresh_window) {
            TokenStatus::Expiring {
                seconds_remaining,
                can_refresh,
            }
        } else {
            TokenStatus::Valid { seconds_remaining }
        }
    }

    async fn read_string(&self, key: &str) -> Option<String> {
        match self.storage.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(error) => {
                warn!(key, %error, "failed to read from token storage");
                None
            }
        }
    }

    async fn read_record(&self) -> Option<TokenRecord> {
        let raw = self.read_string(&self.keys.record).await?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(key = %self.keys.record, %error, "ignoring malformed token record");
                None
            }
        }
    }
}

/// Status of the stored credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// No credentials are stored.
    NotAuthenticated,
    /// Token is valid and outside the refresh window.
    Valid {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
    /// Token is valid but inside the refresh window.
    Expiring {
        /// Seconds until expiry.
        seconds_remaining: i64,
        /// Whether a refresh token is available.
        can_refresh: bool,
    },
    /// Token has expired.
    Expired {
        /// Whether a refresh token is available.
        can_refresh: bool,
    },
}

impl TokenStatus {
    /// Returns true if the token is valid (not expired).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. } | Self::Expiring { .. })
    }

    /// Returns true if the token needs attention (expiring or expired).
    #[must_use]
    pub const fn needs_attention(&self) -> bool {
        matches!(self, Self::Expiring { .. } | Self::Expired { .. })
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Not logged in".to_string(),
            Self::Valid { seconds_remaining } => {
                let secs = *seconds_remaining;
                if secs > 3600 {
                    format!("Valid for {} hours", secs / 3600)
                } else if secs > 60 {
                    format!("Valid for {} minutes", secs / 60)
                } else {
                    format!("Valid for {secs} seconds")
                }
            }
            Self::Expiring {
                seconds_remaining,
                can_refresh,
            } => {
                let refresh_hint = if *can_refresh {
                    " (will auto-refresh)"
                } else {
                    ""
                };
                format!("Expiring in {seconds_remaining} seconds{refresh_hint}")
            }
            Self::Expired { can_refresh: true } => "Expired (can refresh)".to_string(),
            Self::Expired { can_refresh: false } => "Expired".to_string(),
        }
    }
}
