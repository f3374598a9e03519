use crate::domain::{FlightRole, TokenRefresher, TokenStore, endpoints};
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("request failed with status {status}")]
    Status { status: StatusCode, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    anonymous: bool,
    retried: bool,
}

// Bodies may hold passwords or tokens.
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("anonymous", &self.anonymous)
            .field("retried", &self.retried)
            .finish_non_exhaustive()
    }
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            anonymous: false,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Never carries a bearer token and never triggers a refresh.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn is_retry(&self) -> bool {
        self.retried
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    body: String,
}

impl ApiResponse {
    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Every backend call goes through here.
///
/// Attaches the stored access token as a bearer credential. A 401 on a
/// request that still has its retry and a stored refresh token is answered
/// with one refresh and one re-issue. When that refresh fails the session is
/// gone: the user is told, sent to the login route with a full reload, and
/// the caller gets the original 401.
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    store: TokenStore,
    refresher: Arc<TokenRefresher>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    base_url: String,
    login_route: String,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: TokenStore,
        refresher: Arc<TokenRefresher>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        base_url: impl Into<String>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            store,
            refresher,
            navigator,
            notifier,
            base_url: base_url.into(),
            login_route: login_route.into(),
        }
    }

    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let sent_with = if request.anonymous {
            None
        } else {
            self.store.access_token()
        };
        let response = self.dispatch(&request, sent_with.as_ref()).await?;

        if response.status != StatusCode::UNAUTHORIZED
            || request.anonymous
            || request.retried
            || !self.store.has_refresh_token()
        {
            return into_result(response);
        }
        request.retried = true;

        let current = self.store.access_token();
        let bearer = if current.is_some() && current != sent_with {
            debug!(path = %request.path, "access token rotated while request was in flight");
            current
        } else {
            match self.refresher.refresh_with_role().await {
                (_, Ok(access)) => Some(access),
                (FlightRole::Leader, Err(e)) => {
                    warn!(path = %request.path, "session expired, forcing re-login: {}", e);
                    self.notifier.notify(Notice::SessionExpired);
                    self.navigator.hard_redirect(&self.login_route);
                    return into_result(response);
                }
                // The leader of the shared refresh already sent the user to login.
                (FlightRole::Follower, Err(_)) => return into_result(response),
            }
        };

        let response = self.dispatch(&request, bearer.as_ref()).await?;
        into_result(response)
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&AccessToken>,
    ) -> Result<HttpResponse, ApiError> {
        debug!(
            method = %request.method,
            path = %request.path,
            retry = request.retried,
            "api request"
        );
        let http = HttpRequest {
            method: request.method.clone(),
            url: endpoints::join(&self.base_url, &request.path),
            bearer: bearer.map(|token| token.as_str().to_string()),
            body: request.body.clone(),
        };
        Ok(self.transport.execute(http).await?)
    }
}

fn into_result(response: HttpResponse) -> Result<ApiResponse, ApiError> {
    if response.status.is_success() {
        Ok(ApiResponse {
            status: response.status,
            body: response.body,
        })
    } else {
        Err(ApiError::Status {
            status: response.status,
            body: response.body,
        })
    }
}
