use crate::application_port::*;
use crate::domain::*;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;

pub struct RealAccountService {
    client: Arc<ApiClient>,
}

impl RealAccountService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ResetTokenStatus {
    #[serde(default = "default_valid")]
    valid: bool,
}

fn default_valid() -> bool {
    true
}

#[async_trait::async_trait]
impl AccountService for RealAccountService {
    async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post(endpoints::FORGOT_PASSWORD)
            .json(serde_json::json!({ "email": email }));
        self.client.send(request).await?;
        Ok(())
    }

    async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post(endpoints::RESET_PASSWORD)
            .json(serde_json::json!({ "token": token, "password": password }));
        self.client.send(request).await?;
        Ok(())
    }

    async fn activate(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post(endpoints::ACTIVATE)
            .json(serde_json::json!({ "token": token, "password": password }));
        self.client.send(request).await?;
        Ok(())
    }

    async fn check_reset_token(&self, token: &str) -> Result<bool, ApiError> {
        let path = endpoints::reset_token(token)?;
        match self.client.send(ApiRequest::get(path)).await {
            Ok(response) if response.text().trim().is_empty() => Ok(true),
            Ok(response) => Ok(response.json::<ResetTokenStatus>()?.valid),
            Err(e) if matches!(e.status(), Some(StatusCode::NOT_FOUND | StatusCode::GONE)) => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
