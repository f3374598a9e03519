use crate::domain::{TokenStore, endpoints};
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use reqwest::{Method, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Concurrent callers share one backend call.
    SingleFlight,
    /// Every caller issues its own backend call.
    PerRequest,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error("refresh rejected with status {0}")]
    Rejected(StatusCode),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("malformed refresh response: {0}")]
    Decode(String),
}

/// Whether a caller issued the refresh it waited on or joined one already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightRole {
    Leader,
    Follower,
}

type Flight = Shared<BoxFuture<'static, Result<AccessToken, RefreshError>>>;

/// Exchanges the stored refresh token for a new pair.
///
/// Talks to the transport directly, never through [`crate::domain::ApiClient`],
/// so a refresh can not trigger another refresh. Success rotates the stored
/// pair; any failure clears the session.
pub struct TokenRefresher {
    transport: Arc<dyn HttpTransport>,
    store: TokenStore,
    url: String,
    mode: RefreshMode,
    inflight: Mutex<Option<(u64, Flight)>>,
    flight_ids: AtomicU64,
}

impl TokenRefresher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: TokenStore,
        base_url: &str,
        mode: RefreshMode,
    ) -> Self {
        Self {
            transport,
            store,
            url: endpoints::join(base_url, endpoints::REFRESH),
            mode,
            inflight: Mutex::new(None),
            flight_ids: AtomicU64::new(0),
        }
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    pub async fn refresh(&self) -> Result<AccessToken, RefreshError> {
        self.refresh_with_role().await.1
    }

    /// In per-request mode every caller leads its own refresh.
    pub async fn refresh_with_role(&self) -> (FlightRole, Result<AccessToken, RefreshError>) {
        match self.mode {
            RefreshMode::PerRequest => (FlightRole::Leader, self.flight().await),
            RefreshMode::SingleFlight => self.join_flight().await,
        }
    }

    async fn join_flight(&self) -> (FlightRole, Result<AccessToken, RefreshError>) {
        let (id, flight, role) = {
            let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some((id, flight)) => {
                    debug!(flight = id, "joining in-flight token refresh");
                    (*id, flight.clone(), FlightRole::Follower)
                }
                None => {
                    let id = self.flight_ids.fetch_add(1, Ordering::Relaxed);
                    let flight = self.flight().shared();
                    *slot = Some((id, flight.clone()));
                    (id, flight, FlightRole::Leader)
                }
            }
        };

        let result = flight.await;

        let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|(current, _)| *current == id) {
            *slot = None;
        }
        (role, result)
    }

    fn flight(&self) -> BoxFuture<'static, Result<AccessToken, RefreshError>> {
        let transport = self.transport.clone();
        let store = self.store.clone();
        let url = self.url.clone();
        let refresh_token = store.refresh_token();

        async move {
            match request_refresh(transport.as_ref(), url, refresh_token).await {
                Ok(pair) => {
                    let access = pair.access_token.clone();
                    store.rotate(pair);
                    info!("session refreshed");
                    Ok(access)
                }
                Err(e) => {
                    warn!("token refresh failed: {}", e);
                    store.clear_tokens();
                    Err(e)
                }
            }
        }
        .boxed()
    }
}

async fn request_refresh(
    transport: &dyn HttpTransport,
    url: String,
    refresh_token: Option<RefreshToken>,
) -> Result<TokenPair, RefreshError> {
    let refresh_token = refresh_token.ok_or(RefreshError::MissingRefreshToken)?;
    let request = HttpRequest {
        method: Method::POST,
        url,
        bearer: None,
        body: Some(serde_json::json!({ "refreshToken": refresh_token.expose() })),
    };

    let response = transport.execute(request).await?;
    if !response.status.is_success() {
        return Err(RefreshError::Rejected(response.status));
    }
    serde_json::from_str::<TokenPair>(&response.body).map_err(|e| RefreshError::Decode(e.to_string()))
}
