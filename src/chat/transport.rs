//! HTTP transport from the chat front end to the completion proxy.

use std::time::Duration;

use reqwest::Client as ReqwestClient;
use url::Url;

use crate::error::{Error, Result, from_reqwest};
use crate::types::{ChatReply, ChatRequest, ModelCatalog};

/// Default address of a locally running `chatbot-server`.
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000/";

/// How the session reaches the completion proxy.
#[async_trait::async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Send one chat request and return the assistant's text.
    ///
    /// Any failure, including a non-success status, is an error.
    async fn send(&self, request: &ChatRequest) -> Result<String>;
}

/// Talks to `POST /api/chat` on a running proxy.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl ProxyClient {
    /// Create a client for the proxy at `proxy_url`.
    pub fn new(proxy_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(proxy_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The proxy's base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the proxy's model catalog.
    pub async fn models(&self) -> Result<ModelCatalog> {
        let url = self.base_url.join("api/models")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| from_reqwest(e, self.timeout.as_secs_f64()))?;
        if !response.status().is_success() {
            return Err(Error::upstream(response.status().as_u16(), String::new()));
        }
        response
            .json::<ModelCatalog>()
            .await
            .map_err(|e| from_reqwest(e, self.timeout.as_secs_f64()))
    }
}

#[async_trait::async_trait]
impl CompletionTransport for ProxyClient {
    async fn send(&self, request: &ChatRequest) -> Result<String> {
        let url = self.base_url.join("api/chat")?;
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| from_reqwest(e, self.timeout.as_secs_f64()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(status.as_u16(), body));
        }

        let reply = response
            .json::<ChatReply>()
            .await
            .map_err(|e| from_reqwest(e, self.timeout.as_secs_f64()))?;
        Ok(reply.message)
    }
}
