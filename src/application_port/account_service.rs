use crate::domain::ApiError;

/// Password recovery and account activation. These calls work with or
/// without a session.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    async fn forgot_password(&self, email: &str) -> Result<(), ApiError>;
    async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError>;
    async fn activate(&self, token: &str, password: &str) -> Result<(), ApiError>;
    /// `false` when the backend no longer knows the token.
    async fn check_reset_token(&self, token: &str) -> Result<bool, ApiError>;
}
