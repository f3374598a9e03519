use crate::application_port::*;
use crate::domain::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use reqwest::StatusCode;
use std::sync::Arc;

/// The one place that logs users in and out against the backend. The token
/// store only ever sees the results.
pub struct RealAuthService {
    client: Arc<ApiClient>,
    refresher: Arc<TokenRefresher>,
    store: TokenStore,
    notifier: Arc<dyn Notifier>,
}

impl RealAuthService {
    pub fn new(
        client: Arc<ApiClient>,
        refresher: Arc<TokenRefresher>,
        store: TokenStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            refresher,
            store,
            notifier,
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, input: LoginInput) -> Result<(), AuthError> {
        let LoginInput { email, password } = input;

        let request = ApiRequest::post(endpoints::LOGIN)
            .json(serde_json::json!({ "email": email, "password": password }))
            .anonymous();
        let response = self.client.send(request).await.map_err(|e| match e.status() {
            Some(StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                AuthError::InvalidCredentials
            }
            _ => AuthError::Api(e),
        })?;
        let tokens: TokenPair = response.json()?;

        self.store.establish(tokens, Some(email));
        info!("logged in");
        self.notifier.notify(Notice::LoggedIn);
        Ok(())
    }

    async fn validate_token(&self) -> bool {
        let access = self.store.access_token();
        if !is_token_expired(access.as_ref().map(AccessToken::as_str)) {
            if !self.store.is_authenticated() {
                self.store.set_authenticated(true);
            }
            return false;
        }

        if !self.store.has_refresh_token() {
            debug!("no usable credentials");
            self.store.clear_tokens();
            return true;
        }

        debug!("access token missing or expired, refreshing");
        self.refresher.refresh().await.is_err()
    }

    async fn logout(&self) {
        let request =
            ApiRequest::post(endpoints::LOGOUT).json(serde_json::json!({ "logoutAllDevices": true }));
        if let Err(e) = self.client.send(request).await {
            warn!("backend logout failed, clearing local session anyway: {}", e);
        }

        self.store.logout();
        info!("logged out");
        self.notifier.notify(Notice::LoggedOut);
    }

    async fn refresh(&self) -> bool {
        self.refresher.refresh().await.is_ok()
    }
}
