//! HTTP transport abstraction for the suggestion providers.
//!
//! Both provider backends speak JSON-over-POST with provider-specific
//! headers; the trait keeps that transport injectable so provider parsing
//! can be tested against canned responses without a network.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;

/// JSON-over-POST transport used by the suggestion providers.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with a JSON body and returns the response text.
    ///
    /// Transport failures map to
    /// [`PilotError::Provider`](crate::error::PilotError::Provider); the body
    /// is returned verbatim even on non-2xx status so callers can surface
    /// the backend's own error payload.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<String>;
}

/// Production transport backed by reqwest.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<String> {
        let mut request = self.client.post(url);
        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.json(body).send().await?;
        Ok(response.text().await?)
    }
}
