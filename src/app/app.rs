use crate::application_impl::*;
use crate::application_port::*;
use crate::domain::*;
use crate::domain_port::*;
use crate::infra_http::*;
use crate::infra_local::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;

/// Everything the client needs, wired once at startup.
pub struct App {
    pub store: TokenStore,
    pub api: Arc<ApiClient>,
    pub auth_service: Arc<dyn AuthService>,
    pub account_service: Arc<dyn AccountService>,
    pub navigator: Arc<dyn Navigator>,
    guard: SessionGuardHandle,
}

impl App {
    /// Production wiring: reqwest transport, file-backed session, logging
    /// navigator and notifier. Must run inside a Tokio runtime.
    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new(settings.api.timeout())?);
        let persistence: Arc<dyn SessionPersistence> = Arc::new(FileSessionPersistence::new(
            &settings.session.storage_dir,
            &settings.session.storage_key,
        ));
        let navigator: Arc<dyn Navigator> =
            Arc::new(TracingNavigator::new(settings.routes.root.clone()));
        Self::assemble(settings, transport, persistence, navigator, Arc::new(TracingNotifier))
    }

    pub fn assemble(
        settings: &Settings,
        transport: Arc<dyn HttpTransport>,
        persistence: Arc<dyn SessionPersistence>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let base_url = settings.api.base_url.trim_end_matches('/');
        let store = TokenStore::hydrate(persistence);

        let mode = if settings.session.coalesce_refresh {
            RefreshMode::SingleFlight
        } else {
            RefreshMode::PerRequest
        };
        let refresher = Arc::new(TokenRefresher::new(
            transport.clone(),
            store.clone(),
            base_url,
            mode,
        ));
        let api = Arc::new(ApiClient::new(
            transport,
            store.clone(),
            refresher.clone(),
            navigator.clone(),
            notifier.clone(),
            base_url,
            &settings.routes.login,
        ));

        let auth_service: Arc<dyn AuthService> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeAuthService::new(store.clone())),
            "real" => Arc::new(RealAuthService::new(
                api.clone(),
                refresher,
                store.clone(),
                notifier,
            )),
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };
        let account_service: Arc<dyn AccountService> =
            Arc::new(RealAccountService::new(api.clone()));

        let guard = SessionGuard::new(
            auth_service.clone(),
            store.clone(),
            navigator.clone(),
            settings.routes.clone(),
            settings.session.validate_interval(),
        )
        .spawn();

        info!(?mode, backend = %settings.auth.backend, "session client started");

        Ok(Self {
            store,
            api,
            auth_service,
            account_service,
            navigator,
            guard,
        })
    }

    pub fn guard(&self) -> &SessionGuardHandle {
        &self.guard
    }

    pub async fn shutdown(&self) {
        info!("session client shutting down...");
        self.guard.shutdown().await;
        info!("session guard stopped");
    }
}
