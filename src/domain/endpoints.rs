use crate::domain_port::TransportError;
use reqwest::Url;

pub const LOGIN: &str = "/api/v1/auth/login";
pub const REFRESH: &str = "/api/v1/auth/refresh";
pub const LOGOUT: &str = "/api/v1/auth/logout";
pub const FORGOT_PASSWORD: &str = "/api/v1/auth/forgot-password";
pub const RESET_PASSWORD: &str = "/api/v1/auth/reset-password";
pub const ACTIVATE: &str = "/api/v1/auth/activate";

/// The token becomes one percent-encoded path segment, whatever it contains.
pub fn reset_token(token: &str) -> Result<String, TransportError> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| TransportError::InvalidRequest("url cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(["api", "v1", "reset-tokens", token]);
    Ok(url.path().to_string())
}

/// Joins without doubling or dropping the separating slash.
pub fn join(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
