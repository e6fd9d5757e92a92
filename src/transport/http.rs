//! reqwest-backed [`Transport`] talking to the extension backend over HTTP.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::types::MessagesResponse;
use super::{Transport, TransportError};
use crate::config::TransportTimeouts;

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

pub const MESSAGES_PATH: &str = "/messages";
pub const CREDENTIALS_PATH: &str = "/credentials";

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeouts: TransportTimeouts) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: normalize_base_url(base_url) })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status { status: status.as_u16(), body })
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn fetch_messages(&self) -> Result<MessagesResponse, TransportError> {
        let response = self
            .http
            .get(self.url(MESSAGES_PATH))
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let response = check_status(response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))?;
        debug!(count = parsed.messages.len(), "fetched messages");
        Ok(parsed)
    }

    async fn submit_credentials(&self, body: String) -> Result<(), TransportError> {
        let response = self
            .http
            .post(self.url(CREDENTIALS_PATH))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        check_status(response).await?;
        debug!("credentials submitted");
        Ok(())
    }
}
