//! The request dispatcher.
//!
//! [`ApiClient`] turns an [`ApiRequest`] into an HTTP exchange: it resolves
//! the URL, attaches credentials, refreshes tokens that are about to expire,
//! and on a 401 refreshes once and replays the request. Concurrent refreshes
//! collapse into a single call to `auth/refresh`.

mod envelope;
mod refresh;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use linkhub_domain::{
    ApiRequest, ClientConfig, Envelope, OutgoingRequest, RawResponse, ResponseBody, TokenBundle,
    generate_id_v7,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

pub use envelope::EnvelopeExt;
use envelope::decode_envelope;
use refresh::{RefreshState, Role};

use crate::auth::TokenStore;
use crate::error::{ApiError, ApiResult, RefreshError};
use crate::ports::HttpClient;

const REFRESH_PATH: &str = "auth/refresh";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retry,
}

/// Authenticated client for the dashboard API.
///
/// Share one instance (behind an `Arc`) between all callers: the refresh
/// bookkeeping is per instance.
pub struct ApiClient {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
    tokens: Arc<TokenStore>,
    refresh: RefreshState,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("api_version", &self.config.api_version)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client.
    #[must_use]
    pub fn new(config: ClientConfig, http: Arc<dyn HttpClient>, tokens: Arc<TokenStore>) -> Self {
        Self {
            config,
            http,
            tokens,
            refresh: RefreshState::default(),
        }
    }

    /// The client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The token store backing this client.
    #[must_use]
    pub const fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Sends a request and returns its decoded body.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx statuses and refresh failures.
    pub async fn request(&self, request: ApiRequest) -> ApiResult<ResponseBody> {
        Ok(self.fetch(request).await?.decode_body())
    }

    /// Sends a request and returns the raw 2xx response.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Timeout`] / [`ApiError::Network`] when no response arrived
    /// - [`ApiError::Http`] for non-2xx statuses
    /// - [`ApiError::Refresh`] when the session could not be renewed
    pub async fn fetch(&self, request: ApiRequest) -> ApiResult<RawResponse> {
        let public = request.is_public_auth_endpoint();
        let mut attempt = Attempt::First;

        loop {
            if attempt == Attempt::First && !public {
                self.refresh_if_expiring().await?;
            }

            let response = self.exchange(&request, !public).await?;

            if response.is_unauthorized() && !public && attempt == Attempt::First {
                debug!(path = %request.path, "unauthorized, refreshing token before retry");
                self.refresh_access_token().await?;
                attempt = Attempt::Retry;
                continue;
            }

            return check_status(response);
        }
    }

    /// Sends a request and unwraps the envelope's payload as `T`.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::fetch`], plus [`ApiError::Rejected`] and [`ApiError::Decode`].
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let body = self.request(request).await?;
        decode_envelope::<T>(body)?.into_data()
    }

    /// Sends a request whose response carries no payload of interest.
    ///
    /// Non-JSON 2xx bodies (e.g. an empty 204) count as success.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::fetch`], plus [`ApiError::Rejected`].
    pub async fn send_ack(&self, request: ApiRequest) -> ApiResult<()> {
        match self.request(request).await? {
            body @ ResponseBody::Json(_) => decode_envelope::<Value>(body)?.into_ack(),
            ResponseBody::Text(_) => Ok(()),
        }
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(ApiRequest::get(path)).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    /// `PATCH path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::patch(path).json(body)?).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Obtains a new access token, joining a refresh that is already running.
    ///
    /// On failure the token store is cleared before the error is returned.
    ///
    /// # Errors
    ///
    /// [`ApiError::Refresh`] with the reason.
    pub async fn refresh_access_token(&self) -> ApiResult<String> {
        match self.refresh.join() {
            Role::Waiter(receiver) => receiver
                .await
                .unwrap_or(Err(ApiError::Refresh(RefreshError::Abandoned))),
            Role::Leader(flight) => {
                let outcome = self.perform_refresh().await;
                if let Err(error) = &outcome {
                    warn!(%error, "token refresh failed, clearing session");
                    self.tokens.clear_tokens().await;
                }
                flight.settle(outcome.clone());
                outcome
            }
        }
    }

    async fn refresh_if_expiring(&self) -> ApiResult<()> {
        if !self.tokens.is_token_expiring_soon().await {
            return Ok(());
        }
        // Nothing to refresh with; go out with whatever credentials exist.
        if self.tokens.refresh_token().await.is_none() {
            return Ok(());
        }
        match self.refresh_access_token().await {
            Ok(_) | Err(ApiError::Refresh(RefreshError::NoRefreshToken)) => Ok(()),
            Err(error) => Err(error),
        }
    }

    async fn perform_refresh(&self) -> ApiResult<String> {
        let Some(refresh_token) = self.tokens.refresh_token().await else {
            return Err(RefreshError::NoRefreshToken.into());
        };

        let bundle = self
            .request_new_tokens(&refresh_token)
            .await
            .map_err(|error| RefreshError::Failed(Box::new(error)))?;

        self.tokens.save_tokens(&bundle).await;
        info!(expires_in = bundle.expires_in, "access token refreshed");
        Ok(bundle.access_token)
    }

    async fn request_new_tokens(&self, refresh_token: &str) -> ApiResult<TokenBundle> {
        let request =
            ApiRequest::post(REFRESH_PATH).json(&json!({ "refresh_token": refresh_token }))?;
        let response = check_status(self.exchange(&request, false).await?)?;
        decode_envelope::<TokenBundle>(response.decode_body())?.into_data()
    }

    /// One HTTP exchange with no refresh logic.
    async fn exchange(&self, request: &ApiRequest, authenticate: bool) -> ApiResult<RawResponse> {
        let outgoing = self.build(request, authenticate).await?;
        let method = outgoing.method;
        let url = outgoing.url.clone();
        let request_id = outgoing.request_id.clone();
        let started = Instant::now();

        debug!(%method, %url, %request_id, "sending request");
        match self.http.execute(outgoing).await {
            Ok(response) => {
                debug!(
                    %method,
                    %url,
                    %request_id,
                    status = response.status,
                    elapsed = ?started.elapsed(),
                    "received response"
                );
                Ok(response)
            }
            Err(error) => {
                warn!(%method, %url, %request_id, %error, "request failed");
                Err(error.into())
            }
        }
    }

    async fn build(&self, request: &ApiRequest, authenticate: bool) -> ApiResult<OutgoingRequest> {
        let url = self.config.endpoint_url(&request.path, &request.query)?;
        let request_id = generate_id_v7();

        let mut headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            ("X-Request-Id".to_string(), request_id.clone()),
        ]);
        if authenticate {
            if let Some(authorization) = self.tokens.authorization_header().await {
                headers.insert("Authorization".to_string(), authorization);
            }
        }
        for (name, value) in &request.headers {
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            headers.insert(name.clone(), value.clone());
        }

        Ok(OutgoingRequest {
            request_id,
            method: request.method,
            url,
            headers,
            body: request.body_to_send().map(Value::to_string),
            timeout: self.config.timeout(),
        })
    }
}

/// Passes 2xx responses through and turns everything else into [`ApiError::Http`].
fn check_status(response: RawResponse) -> ApiResult<RawResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let body = response.decode_body();
    Err(ApiError::Http {
        status: response.status,
        code: body.server_code(),
        message: body
            .server_message()
            .unwrap_or_else(|| format!("HTTP {}", response.status)),
    })
}
