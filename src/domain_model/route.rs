use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthState {
    Initializing,
    Authenticated,
    Unauthenticated,
}

impl AuthState {
    pub fn is_loading(self) -> bool {
        self == AuthState::Initializing
    }

    pub fn is_authenticated(self) -> bool {
        self == AuthState::Authenticated
    }
}

/// Where the guard sends users, and which routes only make sense without a
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoutePolicy {
    pub root: String,
    pub login: String,
    pub public_only: Vec<String>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        RoutePolicy {
            root: "/".to_string(),
            login: "/login".to_string(),
            public_only: vec![
                "/login".to_string(),
                "/forgot-password".to_string(),
                "/reset-password".to_string(),
                "/activate-account".to_string(),
            ],
        }
    }
}

impl RoutePolicy {
    /// Exact match or a sub-path, so `/reset-password/<token>` counts.
    pub fn is_public_only(&self, path: &str) -> bool {
        let path = strip_query(path);
        self.public_only.iter().any(|route| {
            let route = route.trim_end_matches('/');
            path == route
                || path
                    .strip_prefix(route)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// `None` while loading or when the current route already fits the state.
    pub fn redirect_target(&self, state: AuthState, current_path: &str) -> Option<String> {
        match state {
            AuthState::Initializing => None,
            AuthState::Authenticated if self.is_public_only(current_path) => {
                Some(self.root.clone())
            }
            AuthState::Unauthenticated if !self.is_public_only(current_path) => {
                Some(self.login.clone())
            }
            _ => None,
        }
    }
}

fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].trim_end_matches('/')
}
