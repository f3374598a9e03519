use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

pub const EMAIL: &str = "ada@revalyze.io";
pub const PASSWORD: &str = "correct-horse";

const SIGNING_KEY: &[u8] = b"mock-backend-signing-key";
const ACCESS_TTL_SECS: i64 = 600;

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    jti: String,
}

#[derive(Default)]
pub struct BackendState {
    access: Mutex<HashSet<String>>,
    refresh: Mutex<HashSet<String>>,
    refresh_delay: Duration,
    refresh_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    teams_calls: AtomicUsize,
}

impl BackendState {
    fn mint(&self, user: &str) -> Value {
        let claims = Claims {
            sub: user.to_string(),
            exp: Utc::now().timestamp() + ACCESS_TTL_SECS,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let access = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SIGNING_KEY),
        )
        .unwrap();
        let refresh = uuid::Uuid::new_v4().to_string();
        self.access.lock().unwrap().insert(access.clone());
        self.refresh.lock().unwrap().insert(refresh.clone());
        json!({ "accessToken": access, "refreshToken": refresh })
    }

    fn authorized(&self, header: Option<String>) -> bool {
        let Some(token) = header.as_deref().and_then(|h| h.strip_prefix("Bearer ")) else {
            return false;
        };
        let signed = decode::<Claims>(
            token,
            &DecodingKey::from_secret(SIGNING_KEY),
            &Validation::new(Algorithm::HS256),
        )
        .is_ok();
        signed && self.access.lock().unwrap().contains(token)
    }
}

/// In-process REST backend issuing real HS256 tokens.
pub struct MockBackend {
    pub base_url: String,
    state: Arc<BackendState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self::start_with_refresh_delay(Duration::ZERO).await
    }

    /// Holds refresh responses back so concurrent callers overlap.
    pub async fn start_with_refresh_delay(refresh_delay: Duration) -> Self {
        let state = Arc::new(BackendState {
            refresh_delay,
            ..Default::default()
        });

        let (tx, rx) = oneshot::channel::<()>();
        let (address, server) = warp::serve(routes(state.clone())).bind_with_graceful_shutdown(
            ([127, 0, 0, 1], 0),
            async {
                rx.await.ok();
            },
        );
        tokio::spawn(server);

        Self {
            base_url: format!("http://{}", address),
            state,
            shutdown: Some(tx),
        }
    }

    /// Every access token issued so far stops being accepted.
    pub fn expire_access_tokens(&self) {
        self.state.access.lock().unwrap().clear();
    }

    pub fn revoke_refresh_tokens(&self) {
        self.state.refresh.lock().unwrap().clear();
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.state.logout_calls.load(Ordering::SeqCst)
    }

    pub fn teams_calls(&self) -> usize {
        self.state.teams_calls.load(Ordering::SeqCst)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

fn routes(
    state: Arc<BackendState>,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path!("api" / "v1" / "auth" / "login"))
        .and(warp::body::json())
        .and(with(state.clone()))
        .map(handle_login);

    let refresh = warp::post()
        .and(warp::path!("api" / "v1" / "auth" / "refresh"))
        .and(warp::body::json())
        .and(with(state.clone()))
        .and_then(handle_refresh);

    let logout = warp::post()
        .and(warp::path!("api" / "v1" / "auth" / "logout"))
        .and(with(state.clone()))
        .map(handle_logout);

    let teams = warp::get()
        .and(warp::path!("api" / "v1" / "teams"))
        .and(warp::header::optional::<String>("authorization"))
        .and(with(state))
        .map(handle_teams);

    login.or(refresh).unify().or(logout).unify().or(teams).unify()
}

fn with(
    state: Arc<BackendState>,
) -> impl Filter<Extract = (Arc<BackendState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn handle_login(body: Value, state: Arc<BackendState>) -> Response {
    match (body["email"].as_str(), body["password"].as_str()) {
        (Some(email), Some(PASSWORD)) => warp::reply::json(&state.mint(email)).into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn handle_refresh(body: Value, state: Arc<BackendState>) -> Result<Response, Infallible> {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(state.refresh_delay).await;

    let presented = body["refreshToken"].as_str().unwrap_or_default();
    let known = state.refresh.lock().unwrap().remove(presented);
    if known {
        Ok(warp::reply::json(&state.mint(EMAIL)).into_response())
    } else {
        Ok(StatusCode::UNAUTHORIZED.into_response())
    }
}

fn handle_logout(state: Arc<BackendState>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    state.refresh.lock().unwrap().clear();
    warp::reply::json(&json!({})).into_response()
}

fn handle_teams(authorization: Option<String>, state: Arc<BackendState>) -> Response {
    state.teams_calls.fetch_add(1, Ordering::SeqCst);
    if state.authorized(authorization) {
        warp::reply::json(&json!([{ "id": 1, "name": "Core" }])).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}
