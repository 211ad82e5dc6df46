//! Login, registration and session management.

use std::sync::Arc;

use linkhub_domain::{
    ApiRequest, AuthSession, LoginRequest, PhoneLoginRequest, RegisterRequest, User,
};
use serde_json::json;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::ApiResult;

/// Account endpoints under `auth/`.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Creates an account and stores the issued tokens.
    ///
    /// # Errors
    ///
    /// Returns the server's error, e.g. when the email is taken.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthSession> {
        let session: AuthSession = self.client.post("auth/register", request).await?;
        self.start_session(&session).await;
        Ok(session)
    }

    /// Email/password login. Stores the issued tokens.
    ///
    /// # Errors
    ///
    /// Returns the server's error for bad credentials.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthSession> {
        let session: AuthSession = self
            .client
            .post("auth/login", &LoginRequest::email(email, password))
            .await?;
        self.start_session(&session).await;
        Ok(session)
    }

    /// Phone + verification code login. Stores the issued tokens.
    ///
    /// # Errors
    ///
    /// Returns the server's error for a wrong or expired code.
    pub async fn phone_login(&self, phone: &str, code: &str) -> ApiResult<AuthSession> {
        let request = PhoneLoginRequest {
            phone: phone.to_string(),
            verification_code: code.to_string(),
        };
        let session: AuthSession = self.client.post("auth/phone/login", &request).await?;
        self.start_session(&session).await;
        Ok(session)
    }

    /// Asks the server to text a verification code.
    ///
    /// # Errors
    ///
    /// Returns the server's error, e.g. when rate limited.
    pub async fn send_verification_code(&self, phone: &str) -> ApiResult<()> {
        self.client
            .send_ack(ApiRequest::post("auth/send-code").json(&json!({ "phone": phone }))?)
            .await
    }

    /// Starts the password reset flow for `email`.
    ///
    /// # Errors
    ///
    /// Returns the server's error.
    pub async fn reset_password(&self, email: &str) -> ApiResult<()> {
        self.client
            .send_ack(ApiRequest::post("auth/reset-password").json(&json!({ "email": email }))?)
            .await
    }

    /// Changes the password of the logged-in account.
    ///
    /// # Errors
    ///
    /// Returns the server's error, e.g. when the old password is wrong.
    pub async fn update_password(&self, old_password: &str, new_password: &str) -> ApiResult<()> {
        let body = json!({ "old_password": old_password, "new_password": new_password });
        self.client
            .send_ack(ApiRequest::put("auth/password").json(&body)?)
            .await
    }

    /// Ends the session. The server call is best-effort; local tokens are
    /// cleared regardless of its outcome.
    pub async fn logout(&self) {
        if self.client.tokens().access_token().await.is_some() {
            if let Err(error) = self.client.send_ack(ApiRequest::post("auth/logout")).await {
                warn!(%error, "server logout failed, clearing local session anyway");
            }
        }
        self.client.tokens().clear_tokens().await;
    }

    /// The logged-in account, or `None`.
    ///
    /// Any failure, including an unreachable server, clears the stored
    /// tokens: a session that cannot be verified is not kept.
    pub async fn current_user(&self) -> Option<User> {
        if self.client.tokens().access_token().await.is_none() {
            return None;
        }
        match self.client.get::<User>("auth/me").await {
            Ok(user) => Some(user),
            Err(error) => {
                warn!(%error, "could not verify session, clearing tokens");
                self.client.tokens().clear_tokens().await;
                None
            }
        }
    }

    /// Forces a token refresh, joining one already in flight.
    ///
    /// # Errors
    ///
    /// [`crate::ApiError::Refresh`] when the session cannot be renewed.
    pub async fn refresh_token(&self) -> ApiResult<String> {
        self.client.refresh_access_token().await
    }

    /// True when an unexpired access token is stored.
    pub async fn is_logged_in(&self) -> bool {
        self.client.tokens().is_logged_in().await
    }

    /// The stored access token.
    pub async fn access_token(&self) -> Option<String> {
        self.client.tokens().access_token().await
    }

    /// True when the stored token is inside the refresh window.
    pub async fn is_token_expiring_soon(&self) -> bool {
        self.client.tokens().is_token_expiring_soon().await
    }

    async fn start_session(&self, session: &AuthSession) {
        self.client.tokens().save_tokens(&session.tokens).await;
        info!(user_id = session.user.id, "session started");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ApiError;
    use crate::testing::{Harness, Reply, bundle, ok, status, user_json};
    use linkhub_domain::HttpMethod;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn session_json(access: &str, refresh: &str) -> Value {
        let mut session = bundle(access, refresh, 3600);
        session["user"] = user_json();
        session
    }

    #[tokio::test]
    async fn test_login_stores_tokens() {
        let h = Harness::new();
        h.http.on(HttpMethod::Post, "auth/login", ok(session_json("A", "R")));
        let auth = AuthService::new(h.client.clone());

        let session = auth.login("ada@example.com", "secret").await.unwrap();

        assert_eq!(session.user.username, "ada");
        assert!(auth.is_logged_in().await);
        assert_eq!(auth.access_token().await.as_deref(), Some("A"));
        let body: Value = serde_json::from_str(h.http.calls()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "email": "ada@example.com",
                "password": "secret",
                "platform_type": "web",
                "login_type": "email"
            })
        );
    }

    #[tokio::test]
    async fn test_login_failure_keeps_store_empty() {
        let h = Harness::new();
        h.http.on(
            HttpMethod::Post,
            "auth/login",
            status(
                401,
                json!({
                    "success": false,
                    "error": {"code": "INVALID_CREDENTIALS", "message": "wrong password"}
                }),
            ),
        );
        let auth = AuthService::new(h.client.clone());

        let error = auth.login("ada@example.com", "nope").await.unwrap_err();

        assert_eq!(error.code(), Some("INVALID_CREDENTIALS"));
        assert!(!error.is_session_expired());
        assert!(!auth.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_register_and_phone_login() {
        let h = Harness::new();
        h.http.on(HttpMethod::Post, "auth/register", ok(session_json("A", "R")));
        h.http.on(HttpMethod::Post, "auth/phone/login", ok(session_json("P", "Q")));
        let auth = AuthService::new(h.client.clone());

        auth.register(&RegisterRequest::email("ada", "ada@example.com", "pw").with_phone("+100"))
            .await
            .unwrap();
        assert_eq!(auth.access_token().await.as_deref(), Some("A"));

        auth.phone_login("+100", "123456").await.unwrap();
        assert_eq!(auth.access_token().await.as_deref(), Some("P"));
        assert!(h.http.calls().iter().all(|call| call.authorization().is_none()));
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(HttpMethod::Post, "auth/logout", Reply::Network("connection reset".into()));
        let auth = AuthService::new(h.client.clone());

        auth.logout().await;

        assert_eq!(h.http.calls_to("auth/logout")[0].authorization(), Some("Bearer A"));
        assert!(!auth.is_logged_in().await);
        assert!(h.kv.is_empty());
    }

    #[tokio::test]
    async fn test_current_user() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(HttpMethod::Get, "auth/me", ok(user_json()));
        let auth = AuthService::new(h.client.clone());

        let user = auth.current_user().await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(auth.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_current_user_failure_clears_tokens() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(HttpMethod::Get, "auth/me", status(500, json!({"message": "db down"})));
        let auth = AuthService::new(h.client.clone());

        assert_eq!(auth.current_user().await, None);
        assert!(!auth.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_current_user_without_session_skips_server() {
        let h = Harness::new();
        let auth = AuthService::new(h.client.clone());

        assert_eq!(auth.current_user().await, None);
        assert!(h.http.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let h = Harness::new();
        let auth = AuthService::new(h.client.clone());

        let error = auth.refresh_token().await.unwrap_err();
        assert!(matches!(error, ApiError::Refresh(crate::RefreshError::NoRefreshToken)));
    }

    #[tokio::test]
    async fn test_update_password_is_authenticated() {
        let h = Harness::logged_in("A", "R").await;
        h.http.on(HttpMethod::Put, "auth/password", ok(json!(null)));
        let auth = AuthService::new(h.client.clone());

        auth.update_password("old", "new").await.unwrap();

        let call = &h.http.calls_to("auth/password")[0];
        assert_eq!(call.authorization(), Some("Bearer A"));
        let body: Value = serde_json::from_str(call.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"old_password": "old", "new_password": "new"}));
    }
}
