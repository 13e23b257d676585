use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use url::Url;

use crate::config::ApiKey;
use crate::error::{Error, Result, from_reqwest};
use crate::proxy::CompletionProvider;
use crate::types::{CompletionRequest, CompletionResponse};

/// Base URL of the OpenRouter API.
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/";
/// Referer sent when no site URL is configured.
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
/// Application name OpenRouter attributes requests to.
pub const APP_TITLE: &str = "AI ChatBot";
/// Upper bound on a single completion call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const COMPLETIONS_PATH: &str = "chat/completions";

/// Client for OpenRouter's OpenAI-compatible completion endpoint.
///
/// The client holds no credential: the proxy attaches its server-held key to
/// each call, so one client can be shared by every request handler.
#[derive(Debug, Clone)]
pub struct OpenRouter {
    client: ReqwestClient,
    endpoint: Url,
    site_url: String,
    timeout: Duration,
}

impl OpenRouter {
    /// Create a new client against the public OpenRouter API.
    pub fn new() -> Result<Self> {
        Self::with_options(None, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        base_url: Option<&str>,
        site_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let endpoint = completions_endpoint(base_url.unwrap_or(DEFAULT_API_URL))?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
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
            endpoint,
            site_url: site_url.unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            timeout,
        })
    }

    /// The fully resolved completion endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Create and return headers for a completion request.
    fn request_headers(&self, api_key: &ApiKey) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key.expose()))
            .map_err(|_| Error::internal("API key contains characters not valid in a header"))?;
        headers.insert(header::AUTHORIZATION, bearer);
        let referer = HeaderValue::from_str(&self.site_url)
            .map_err(|_| Error::internal("site URL is not a valid header value"))?;
        headers.insert("HTTP-Referer", referer);
        headers.insert("X-Title", HeaderValue::from_static(APP_TITLE));
        Ok(headers)
    }

    /// Read a failed response and convert it to our Error type.
    ///
    /// The body is kept on the error for server-side logging only.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => format!("<unreadable error body: {e}>"),
        };
        Error::upstream(status_code, body)
    }

    /// Request a completion and return the provider's parsed response.
    pub async fn complete(
        &self,
        api_key: &ApiKey,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        let timeout_secs = self.timeout.as_secs_f64();
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.request_headers(api_key)?)
            .json(request)
            .send()
            .await
            .map_err(|e| from_reqwest(e, timeout_secs))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| from_reqwest(e, timeout_secs))?;
        serde_json::from_slice::<CompletionResponse>(&body).map_err(|e| {
            Error::serialization(
                format!("Failed to parse completion response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenRouter {
    async fn complete(
        &self,
        api_key: &ApiKey,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        OpenRouter::complete(self, api_key, request).await
    }
}

/// Resolve `chat/completions` against a base URL, tolerating a missing
/// trailing slash.
fn completions_endpoint(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(COMPLETIONS_PATH)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint() {
        let client = OpenRouter::new().unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn endpoint_without_trailing_slash() {
        let client =
            OpenRouter::with_options(Some("http://127.0.0.1:9000/api/v1"), None, None).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "http://127.0.0.1:9000/api/v1/chat/completions"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = OpenRouter::with_options(Some("not a url"), None, None).unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn headers_carry_credential_and_identification() {
        let client =
            OpenRouter::with_options(None, Some("https://chat.example".to_string()), None).unwrap();
        let headers = client.request_headers(&ApiKey::new("sk-or-test")).unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer sk-or-test");
        assert_eq!(headers["HTTP-Referer"], "https://chat.example");
        assert_eq!(headers["X-Title"], "AI ChatBot");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn default_referer_is_local_development() {
        let client = OpenRouter::new().unwrap();
        let headers = client.request_headers(&ApiKey::new("k")).unwrap();
        assert_eq!(headers["HTTP-Referer"], "http://localhost:3000");
    }

    #[test]
    fn credential_unusable_in_header_is_internal() {
        let client = OpenRouter::new().unwrap();
        for key in ["bad\nkey", "sk-or-abc\r"] {
            let err = client.request_headers(&ApiKey::new(key)).unwrap_err();
            assert!(matches!(err, Error::Internal { .. }));
            assert_eq!(err.http_status(), 500);
            assert_eq!(err.public_message(), "Internal server error");
        }
    }
}
