use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// Single source of truth for the session.
///
/// Cloning is cheap and every clone observes the same state. Each mutation is
/// published to subscribers as one change and then persisted, so a
/// subscriber never sees half of a clear or a token swap.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<Session>,
    persistence: Arc<dyn SessionPersistence>,
    writer: Mutex<()>,
}

impl TokenStore {
    /// Rehydrates from `persistence`; a missing or unreadable entry starts empty.
    pub fn hydrate(persistence: Arc<dyn SessionPersistence>) -> Self {
        let session = match persistence.load() {
            Ok(Some(session)) => {
                debug!(
                    has_access = session.access_token.is_some(),
                    has_refresh = session.refresh_token.is_some(),
                    "session rehydrated"
                );
                session
            }
            Ok(None) => Session::default(),
            Err(e) => {
                warn!("ignoring persisted session: {}", e);
                Session::default()
            }
        };
        let (state, _) = watch::channel(session);
        Self {
            inner: Arc::new(Inner {
                state,
                persistence,
                writer: Mutex::new(()),
            }),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        self.inner.state.borrow().access_token.clone()
    }

    pub(crate) fn refresh_token(&self) -> Option<RefreshToken> {
        self.inner.state.borrow().refresh_token.clone()
    }

    pub fn has_refresh_token(&self) -> bool {
        self.inner.state.borrow().has_refresh_token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated
    }

    pub fn user(&self) -> Option<String> {
        self.inner.state.borrow().user.clone()
    }

    /// Overwrites both tokens. The authenticated flag is left alone.
    pub fn set_tokens(&self, access: AccessToken, refresh: RefreshToken) {
        self.mutate(|s| {
            s.access_token = Some(access);
            s.refresh_token = Some(refresh);
        });
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.mutate(|s| s.is_authenticated = authenticated);
    }

    /// Records a successful login: tokens, identity marker and flag together.
    pub fn establish(&self, tokens: TokenPair, user: Option<String>) {
        self.mutate(|s| {
            s.access_token = Some(tokens.access_token);
            s.refresh_token = Some(tokens.refresh_token);
            s.user = user;
            s.is_authenticated = true;
        });
    }

    /// Stores a refreshed pair and marks the session authenticated.
    pub fn rotate(&self, tokens: TokenPair) {
        self.mutate(|s| {
            s.access_token = Some(tokens.access_token);
            s.refresh_token = Some(tokens.refresh_token);
            s.is_authenticated = true;
        });
    }

    pub fn clear_tokens(&self) {
        self.mutate(|s| {
            s.access_token = None;
            s.refresh_token = None;
            s.is_authenticated = false;
        });
    }

    pub fn logout(&self) {
        self.mutate(|s| {
            s.access_token = None;
            s.refresh_token = None;
            s.user = None;
            s.is_authenticated = false;
        });
    }

    // Writers are serialized so saves land in publish order. The save runs
    // after the channel lock is released; readers are never held up by disk.
    fn mutate(&self, f: impl FnOnce(&mut Session)) {
        let _writer = self
            .inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut changed = None;
        self.inner.state.send_if_modified(|current| {
            let before = current.clone();
            f(current);
            if *current == before {
                return false;
            }
            changed = Some(current.clone());
            true
        });
        if let Some(session) = changed {
            if let Err(e) = self.inner.persistence.save(&session) {
                warn!("failed to persist session: {}", e);
            }
        }
    }
}
