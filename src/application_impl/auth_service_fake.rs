use crate::application_port::*;
use crate::domain::TokenStore;
use crate::domain_model::*;
use std::sync::atomic::{AtomicUsize, Ordering};

const ACCESS_PREFIX: &str = "fake-access-token:";
const REFRESH_PREFIX: &str = "fake-refresh-token:";

/// Offline stand-in that never touches the network.
pub struct FakeAuthService {
    store: TokenStore,
    validations: AtomicUsize,
}

impl FakeAuthService {
    pub fn new(store: TokenStore) -> Self {
        Self {
            store,
            validations: AtomicUsize::new(0),
        }
    }

    pub fn validations(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }
}

// Minimal fake implementation for basic use only.
// Any credentials log in; only tokens it minted itself are accepted.
#[async_trait::async_trait]
impl AuthService for FakeAuthService {
    async fn login(&self, input: LoginInput) -> Result<(), AuthError> {
        if input.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        self.store.establish(get_fake_tokens(&input.email), Some(input.email));
        Ok(())
    }

    async fn validate_token(&self) -> bool {
        self.validations.fetch_add(1, Ordering::SeqCst);
        let valid = self
            .store
            .access_token()
            .is_some_and(|token| token.as_str().starts_with(ACCESS_PREFIX));
        if valid {
            if !self.store.is_authenticated() {
                self.store.set_authenticated(true);
            }
            false
        } else {
            self.store.clear_tokens();
            true
        }
    }

    async fn logout(&self) {
        self.store.logout();
    }

    async fn refresh(&self) -> bool {
        let user = self
            .store
            .refresh_token()
            .and_then(|token| token.expose().strip_prefix(REFRESH_PREFIX).map(str::to_string));
        match user {
            Some(user) => {
                self.store.rotate(get_fake_tokens(&user));
                true
            }
            None => {
                self.store.clear_tokens();
                false
            }
        }
    }
}

fn get_fake_tokens(user: &str) -> TokenPair {
    TokenPair {
        access_token: AccessToken(format!("{}{}", ACCESS_PREFIX, user)),
        refresh_token: RefreshToken::new(format!("{}{}", REFRESH_PREFIX, user)),
    }
}
