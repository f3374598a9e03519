use crate::domain::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("backend error: {0}")]
    Api(#[from] ApiError),
}

#[derive(Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginInput")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Stores the returned pair on success. The store is untouched on failure.
    async fn login(&self, input: LoginInput) -> Result<(), AuthError>;
    /// `true` when the user has to log in again, `false` when the session is
    /// valid or was refreshed.
    async fn validate_token(&self) -> bool;
    /// Always ends with an empty local session, whatever the backend says.
    async fn logout(&self);
    async fn refresh(&self) -> bool;
}
