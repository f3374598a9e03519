use crate::domain_port::*;
use crate::logger::*;
use std::time::Duration;

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// `None` leaves requests without a deadline.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(Self { client })
    }
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_builder() {
        TransportError::InvalidRequest(e.to_string())
    } else {
        TransportError::Connection(e.to_string())
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        trace!(?request, "sending");
        let HttpRequest {
            method,
            url,
            bearer,
            body,
        } = request;

        let mut builder = self.client.request(method, &url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_error)?;
        trace!(%status, %url, "received");
        Ok(HttpResponse { status, body })
    }
}
