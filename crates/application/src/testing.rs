//! Test doubles for the ports.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use linkhub_domain::{ClientConfig, HttpMethod, OutgoingRequest, RawResponse, TokenBundle};
use serde_json::{Value, json};

use crate::auth::TokenStore;
use crate::client::ApiClient;
use crate::ports::{Clock, HttpClient, HttpFuture, KeyValueStore, StorageError, TransportError};

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// In-memory key-value store that can be told to fail writes.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryKv {
    pub fn insert(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn get_now(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn remove_now(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("quota exceeded".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_now(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.remove_now(key);
        Ok(())
    }
}

/// A canned transport reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(RawResponse),
    Delayed(Duration, RawResponse),
    Timeout,
    Network(String),
}

/// Scripted transport keyed by method and URL path.
///
/// Replies for a route are consumed in order; the last one repeats.
#[derive(Debug, Default)]
pub struct FakeHttp {
    routes: Mutex<HashMap<(HttpMethod, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<OutgoingRequest>>,
}

impl FakeHttp {
    pub fn on(&self, method: HttpMethod, path: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, api_path(path)))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<OutgoingRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<OutgoingRequest> {
        let path = api_path(path);
        self.calls()
            .into_iter()
            .filter(|call| call.url.path() == path)
            .collect()
    }

    fn next_reply(&self, method: HttpMethod, path: &str) -> Option<Reply> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl HttpClient for FakeHttp {
    fn execute(&self, request: OutgoingRequest) -> HttpFuture<'_> {
        let reply = self.next_reply(request.method, request.url.path());
        let timeout_ms = u64::try_from(request.timeout.as_millis()).unwrap();
        self.calls.lock().unwrap().push(request);

        Box::pin(async move {
            match reply {
                Some(Reply::Respond(response)) => Ok(response),
                Some(Reply::Delayed(delay, response)) => {
                    tokio::time::sleep(delay).await;
                    Ok(response)
                }
                Some(Reply::Timeout) => Err(TransportError::Timeout { timeout_ms }),
                Some(Reply::Network(message)) => Err(TransportError::Network(message)),
                None => Ok(RawResponse::json(
                    404,
                    &json!({"success": false, "error": "route not scripted"}),
                )),
            }
        })
    }
}

pub fn api_path(path: &str) -> String {
    format!("/api/v1/{}", path.trim_start_matches('/'))
}

pub fn ok_response(data: Value) -> RawResponse {
    RawResponse::json(200, &json!({"success": true, "data": data}))
}

pub fn ok(data: Value) -> Reply {
    Reply::Respond(ok_response(data))
}

pub fn status(code: u16, body: Value) -> Reply {
    Reply::Respond(RawResponse::json(code, &body))
}

pub fn bundle(access: &str, refresh: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": expires_in,
        "token_type": "Bearer"
    })
}

pub fn user_json() -> Value {
    json!({
        "id": 7,
        "username": "ada",
        "email": "ada@example.com",
        "role": "member",
        "status": "active",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

/// A client wired to fakes.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub kv: Arc<MemoryKv>,
    pub http: Arc<FakeHttp>,
    pub tokens: Arc<TokenStore>,
    pub client: Arc<ApiClient>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::default());
        let kv = Arc::new(MemoryKv::default());
        let http = Arc::new(FakeHttp::default());
        let tokens = Arc::new(TokenStore::new(kv.clone(), clock.clone()));
        let config = ClientConfig::with_base_url("http://api.test");
        let client = Arc::new(ApiClient::new(config, http.clone(), tokens.clone()));
        Self {
            clock,
            kv,
            http,
            tokens,
            client,
        }
    }

    /// A harness whose store holds a bundle valid for an hour.
    pub async fn logged_in(access: &str, refresh: &str) -> Self {
        let harness = Self::new();
        harness
            .tokens
            .save_tokens(&TokenBundle::bearer(access, refresh, 3600))
            .await;
        harness
    }
}
