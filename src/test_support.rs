//! In-process doubles for the ports, shared by unit tests.

use crate::domain::TokenStore;
use crate::domain_port::*;
use crate::infra_local::MemorySessionPersistence;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::{Method, StatusCode};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "http://backend.test";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl RecordedCall {
    pub fn path(&self) -> &str {
        self.url.strip_prefix(BASE_URL).unwrap_or(&self.url)
    }
}

type Handler = dyn Fn(&RecordedCall) -> Result<HttpResponse, TransportError> + Send + Sync;

pub struct ScriptedTransport {
    handler: Box<Handler>,
    delays: Vec<(String, Duration)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new(
        handler: impl Fn(&RecordedCall) -> Result<HttpResponse, TransportError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            delays: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Holds responses for `path` back, so concurrent callers overlap.
    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.push((path.to_string(), delay));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| c.path() == path).count()
    }
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let call = RecordedCall {
            method: request.method,
            url: request.url,
            bearer: request.bearer,
            body: request.body,
        };
        self.calls.lock().unwrap().push(call.clone());

        let delay = self
            .delays
            .iter()
            .find(|(path, _)| path == call.path())
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(&call)
    }
}

pub fn json_response(status: u16, body: serde_json::Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: StatusCode::from_u16(status).unwrap(),
        body: body.to_string(),
    })
}

pub fn status_response(status: u16) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: StatusCode::from_u16(status).unwrap(),
        body: String::new(),
    })
}

pub fn token_pair_json(access: &str, refresh: &str) -> serde_json::Value {
    serde_json::json!({ "accessToken": access, "refreshToken": refresh })
}

/// JWT signed with a throwaway key; only `exp` matters to the inspector.
pub fn jwt_expiring_in(secs: i64) -> String {
    let claims = serde_json::json!({ "sub": "u1", "exp": Utc::now().timestamp() + secs });
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"test-signing-key"),
    )
    .unwrap()
}

pub fn memory_store() -> TokenStore {
    TokenStore::hydrate(Arc::new(MemorySessionPersistence::new()))
}

#[derive(Default)]
pub struct RecordingNavigator {
    path: Mutex<String>,
    replaced: Mutex<Vec<String>>,
    hard: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn at(path: &str) -> Self {
        Self {
            path: Mutex::new(path.to_string()),
            ..Default::default()
        }
    }

    pub fn set_path(&self, path: &str) {
        *self.path.lock().unwrap() = path.to_string();
    }

    pub fn replaced(&self) -> Vec<String> {
        self.replaced.lock().unwrap().clone()
    }

    pub fn hard_redirects(&self) -> Vec<String> {
        self.hard.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.lock().unwrap().clone()
    }

    fn replace(&self, path: &str) {
        self.set_path(path);
        self.replaced.lock().unwrap().push(path.to_string());
    }

    fn hard_redirect(&self, path: &str) {
        self.set_path(path);
        self.hard.lock().unwrap().push(path.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
