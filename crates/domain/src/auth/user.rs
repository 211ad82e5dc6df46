//! Account types and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TokenBundle;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full administrative access.
    Admin,
    /// Regular member.
    #[default]
    Member,
    /// Read-only access.
    Viewer,
    /// A role this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account in good standing.
    #[default]
    Active,
    /// Account not yet activated or deactivated.
    Inactive,
    /// Account banned by an administrator.
    Banned,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// A user account as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account id.
    pub id: i64,
    /// Display name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Role within the platform.
    #[serde(default)]
    pub role: UserRole,
    /// Account status.
    #[serde(default)]
    pub status: UserStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Successful login, registration or phone-login payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Issued credentials.
    #[serde(flatten)]
    pub tokens: TokenBundle,
    /// The authenticated account.
    pub user: User,
}

/// Email/password login body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Client platform, "web" for this client.
    pub platform_type: String,
    /// Login method, "email" for this client.
    pub login_type: String,
}

impl LoginRequest {
    /// Builds an email login from the web platform.
    #[must_use]
    pub fn email(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            platform_type: "web".to_string(),
            login_type: "email".to_string(),
        }
    }
}

/// Registration body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired display name.
    pub username: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Client platform.
    pub platform_type: String,
    /// Registration method.
    pub register_type: String,
}

impl RegisterRequest {
    /// Builds an email registration from the web platform.
    #[must_use]
    pub fn email(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            phone: None,
            platform_type: "web".to_string(),
            register_type: "email".to_string(),
        }
    }

    /// Attaches a phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Phone + verification code login body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneLoginRequest {
    /// Phone number the code was sent to.
    pub phone: String,
    /// One-time verification code.
    pub verification_code: String,
}
