use crate::application_port::AuthService;
use crate::domain::{RouteGate, TokenStore};
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_VALIDATE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Application-wide authentication state and the redirects it implies.
///
/// Validates once at start, then on every tick of `interval` and whenever
/// the stored tokens change. Changes the validation pass makes itself (a
/// refresh, a clear) do not schedule another pass.
pub struct SessionGuard {
    auth: Arc<dyn AuthService>,
    store: TokenStore,
    navigator: Arc<dyn Navigator>,
    routes: RoutePolicy,
    interval: Duration,
}

impl SessionGuard {
    pub fn new(
        auth: Arc<dyn AuthService>,
        store: TokenStore,
        navigator: Arc<dyn Navigator>,
        routes: RoutePolicy,
        interval: Duration,
    ) -> Self {
        Self {
            auth,
            store,
            navigator,
            routes,
            interval,
        }
    }

    pub fn spawn(self) -> SessionGuardHandle {
        let (state_tx, state_rx) = watch::channel(AuthState::Initializing);
        let cancel = CancellationToken::new();
        let navigator = self.navigator.clone();
        let routes = self.routes.clone();

        let task = tokio::spawn(self.run(state_tx, cancel.clone()));

        SessionGuardHandle {
            state: state_rx,
            navigator,
            routes,
            cancel,
            task: Mutex::new(Some(task)),
        }
    }

    async fn run(self, state: watch::Sender<AuthState>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sessions = self.store.subscribe();
        let mut seen = sessions.borrow_and_update().clone();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
                changed = sessions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = sessions.borrow_and_update().clone();
                    let tokens_changed = !current.same_tokens(&seen);
                    seen = current;
                    if !tokens_changed {
                        continue;
                    }
                    debug!("stored tokens changed, revalidating");
                }
            }

            let next = if self.auth.validate_token().await {
                AuthState::Unauthenticated
            } else {
                AuthState::Authenticated
            };
            // Redirect first so observers of the new state see the final route.
            apply_redirect(self.navigator.as_ref(), &self.routes, next);
            let previous = state.send_replace(next);
            if previous != next {
                info!(?previous, ?next, "auth state changed");
            }

            seen = sessions.borrow_and_update().clone();
        }

        debug!("session guard stopped");
    }
}

fn apply_redirect(navigator: &dyn Navigator, routes: &RoutePolicy, state: AuthState) {
    let current = navigator.current_path();
    if let Some(target) = routes.redirect_target(state, &current) {
        debug!(from = %current, to = %target, "redirecting");
        navigator.replace(&target);
    }
}

pub struct SessionGuardHandle {
    state: watch::Receiver<AuthState>,
    navigator: Arc<dyn Navigator>,
    routes: RoutePolicy,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionGuardHandle {
    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.clone()
    }

    /// Resolves once the first validation pass has finished.
    pub async fn ready(&self) -> AuthState {
        let mut rx = self.state.clone();
        match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        }
    }

    /// Re-applies the redirect policy after a navigation.
    pub fn route_changed(&self) {
        apply_redirect(self.navigator.as_ref(), &self.routes, self.state());
    }

    pub fn gate(&self) -> RouteGate<'_> {
        RouteGate::new(self.state(), &self.routes.root)
    }

    /// Stops the periodic timer. A validation already in progress runs to
    /// completion first.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("session guard task failed: {}", e);
            }
        }
    }
}

impl Drop for SessionGuardHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
