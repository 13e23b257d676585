//! The completion proxy: validate, attach the credential, forward, translate.
//!
//! [`CompletionProxy::handle`] is the whole pipeline.  It is stateless apart
//! from its immutable settings, so one instance serves every request.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{ApiKey, MAX_TOKENS, ServerConfig, TEMPERATURE};
use crate::error::{Error, Result};
use crate::observability::{
    PROXY_CONFIGURATION_ERRORS, PROXY_FALLBACK_REPLIES, PROXY_INTERNAL_ERRORS,
    PROXY_INVALID_REQUESTS, PROXY_REQUEST_DURATION, PROXY_REQUESTS, PROXY_UPSTREAM_ERRORS,
};
use crate::types::{ChatReply, ChatRequest, CompletionRequest, CompletionResponse};

/// Reply used when the provider succeeds without any content.
pub const EMPTY_COMPLETION_FALLBACK: &str = "Sorry, I could not generate a response.";

/// Something that can turn a completion request into a completion response.
///
/// [`crate::OpenRouter`] is the production implementation.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Perform exactly one completion call.
    async fn complete(
        &self,
        api_key: &ApiKey,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse>;
}

/// Per-deployment settings of the proxy.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    /// Server-held provider credential.
    pub api_key: Option<ApiKey>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Token limit.
    pub max_tokens: u32,
}

impl ProxySettings {
    /// Settings with the fixed sampling parameters and the given credential.
    pub fn new(api_key: Option<ApiKey>) -> Self {
        Self {
            api_key,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

impl From<&ServerConfig> for ProxySettings {
    fn from(config: &ServerConfig) -> Self {
        Self::new(config.api_key.clone())
    }
}

/// The stateless request handler behind `POST /api/chat`.
#[derive(Clone)]
pub struct CompletionProxy {
    provider: Arc<dyn CompletionProvider>,
    settings: ProxySettings,
}

impl CompletionProxy {
    /// Create a proxy over a provider.
    pub fn new(provider: Arc<dyn CompletionProvider>, settings: ProxySettings) -> Self {
        Self { provider, settings }
    }

    /// Validate, forward and translate one chat request.
    ///
    /// Errors carry enough detail for server-side logging; callers must only
    /// show clients [`Error::public_message`].
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatReply> {
        PROXY_REQUESTS.click();
        let start = Instant::now();
        let result = self.forward(request).await;
        PROXY_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            record_failure(err);
        }
        result
    }

    /// Account for a request whose body could not be read at all.
    ///
    /// Returns `err` so the caller can turn it into a response.
    pub fn reject(&self, err: Error) -> Error {
        PROXY_REQUESTS.click();
        record_failure(&err);
        err
    }

    async fn forward(&self, request: ChatRequest) -> Result<ChatReply> {
        let (message, model) = validate(request)?;
        let api_key = self
            .settings
            .api_key
            .as_ref()
            .ok_or_else(|| {
                Error::configuration(format!("{} is not set", crate::config::API_KEY_ENV))
            })?;

        let completion = CompletionRequest::single_turn(
            model,
            message,
            self.settings.temperature,
            self.settings.max_tokens,
        );
        tracing::debug!(model = %completion.model, "forwarding chat request");
        let response = self.provider.complete(api_key, &completion).await?;

        let message = match response.first_content() {
            Some(content) => content.to_string(),
            None => {
                PROXY_FALLBACK_REPLIES.click();
                tracing::warn!(model = %completion.model, "provider returned no content");
                EMPTY_COMPLETION_FALLBACK.to_string()
            }
        };
        Ok(ChatReply { message })
    }
}

fn record_failure(err: &Error) {
    match err {
        Error::InvalidRequest { .. } => PROXY_INVALID_REQUESTS.click(),
        Error::Configuration { .. } => {
            PROXY_CONFIGURATION_ERRORS.click();
            tracing::error!(error = %err, "provider credential is not configured");
        }
        Error::Upstream { status_code, body } => {
            PROXY_UPSTREAM_ERRORS.click();
            tracing::error!(status = status_code, body = %body, "OpenRouter API error");
        }
        _ => {
            PROXY_INTERNAL_ERRORS.click();
            tracing::error!(error = %err, "chat request failed");
        }
    }
}

/// Both fields must be present and non-empty.
fn validate(request: ChatRequest) -> Result<(String, String)> {
    let ChatRequest { message, model } = request;
    let message = message.filter(|m| !m.is_empty());
    let model = model.filter(|m| !m.is_empty());
    match (message, model) {
        (Some(message), Some(model)) => Ok((message, model)),
        (None, _) => Err(missing_field("message")),
        (_, None) => Err(missing_field("model")),
    }
}

fn missing_field(field: &str) -> Error {
    Error::invalid_request(format!("{field} is required"), Some(field.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use biometrics::Sensor;
    use serde_json::json;

    use super::*;

    /// Provider double that records every call and replays a canned outcome.
    pub(crate) struct ScriptedProvider {
        outcome: Result<serde_json::Value>,
        pub(crate) calls: Mutex<Vec<(ApiKey, CompletionRequest)>>,
    }

    impl ScriptedProvider {
        pub(crate) fn replying(body: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(body),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(err: Error) -> Arc<Self> {
            Arc::new(Self {
                outcome: Err(err),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(
            &self,
            api_key: &ApiKey,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((api_key.clone(), request.clone()));
            match &self.outcome {
                Ok(body) => Ok(serde_json::from_value(body.clone())?),
                Err(err) => Err(err.clone()),
            }
        }
    }

    pub(crate) fn proxy_with(
        provider: Arc<ScriptedProvider>,
        key: Option<&str>,
    ) -> CompletionProxy {
        CompletionProxy::new(provider, ProxySettings::new(key.map(ApiKey::new)))
    }

    fn hi() -> serde_json::Value {
        json!({"choices": [{"message": {"content": "Hi"}}]})
    }

    #[tokio::test]
    async fn success_returns_first_choice() {
        let provider = ScriptedProvider::replying(hi());
        let proxy = proxy_with(provider.clone(), Some("sk-or-1"));

        let reply = proxy
            .handle(ChatRequest::new("Hello", "google/gemma-3n-e2b-it:free"))
            .await
            .unwrap();
        assert_eq!(reply.message, "Hi");

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (key, request) = &calls[0];
        assert_eq!(key.expose(), "sk-or-1");
        assert_eq!(request.model, "google/gemma-3n-e2b-it:free");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, "Hello");
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 1000);
    }

    #[tokio::test]
    async fn missing_or_empty_fields_never_reach_the_provider() {
        let provider = ScriptedProvider::replying(hi());
        let proxy = proxy_with(provider.clone(), Some("sk-or-1"));

        for request in [
            ChatRequest::new("", "x"),
            ChatRequest::new("hello", ""),
            ChatRequest {
                message: None,
                model: Some(String::new()),
            },
            ChatRequest {
                message: Some("hello".to_string()),
                model: None,
            },
            ChatRequest::default(),
        ] {
            let err = proxy.handle(request).await.unwrap_err();
            assert!(err.is_invalid_request());
            assert_eq!(err.http_status(), 400);
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn whitespace_message_is_forwarded() {
        let provider = ScriptedProvider::replying(hi());
        let proxy = proxy_with(provider.clone(), Some("k"));
        proxy.handle(ChatRequest::new("  ", "x")).await.unwrap();
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn validation_precedes_credential_check() {
        let provider = ScriptedProvider::replying(hi());
        let proxy = proxy_with(provider.clone(), None);
        let err = proxy.handle(ChatRequest::default()).await.unwrap_err();
        assert!(err.is_invalid_request());
    }

    #[tokio::test]
    async fn missing_credential_is_a_configuration_error() {
        let provider = ScriptedProvider::replying(hi());
        let proxy = proxy_with(provider.clone(), None);

        let err = proxy
            .handle(ChatRequest::new("Hello", "x"))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.public_message(), "OpenRouter API key not configured");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn credential_unusable_in_header_is_internal() {
        let provider = Arc::new(crate::client::OpenRouter::new().unwrap());
        let proxy = CompletionProxy::new(
            provider,
            ProxySettings::new(Some(ApiKey::new("sk-or-abc\r"))),
        );

        let err = proxy
            .handle(ChatRequest::new("Hello", "x"))
            .await
            .unwrap_err();
        assert!(!err.is_configuration());
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn rejected_body_is_counted_as_internal() {
        let proxy = proxy_with(ScriptedProvider::replying(hi()), Some("k"));
        let requests = PROXY_REQUESTS.read();
        let internal = PROXY_INTERNAL_ERRORS.read();

        let err = proxy.reject(Error::internal("unreadable body"));
        assert_eq!(err.http_status(), 500);
        assert!(PROXY_REQUESTS.read() > requests);
        assert!(PROXY_INTERNAL_ERRORS.read() > internal);
    }

    #[tokio::test]
    async fn missing_content_falls_back() {
        for body in [
            json!({"choices": [{}]}),
            json!({"choices": []}),
            json!({"choices": [{"message": {"content": ""}}]}),
            json!({"error": {"message": "Provider returned error", "code": 502}}),
        ] {
            let provider = ScriptedProvider::replying(body);
            let proxy = proxy_with(provider, Some("k"));
            let reply = proxy.handle(ChatRequest::new("Hello", "x")).await.unwrap();
            assert_eq!(reply.message, "Sorry, I could not generate a response.");
        }
    }

    #[tokio::test]
    async fn upstream_status_is_propagated() {
        let provider = ScriptedProvider::failing(Error::upstream(
            402,
            r#"{"error":{"message":"Insufficient credits"}}"#,
        ));
        let proxy = proxy_with(provider.clone(), Some("k"));

        let err = proxy
            .handle(ChatRequest::new("Hello", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 402);
        assert_eq!(err.public_message(), "Failed to get AI response");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn transport_failures_are_internal() {
        let provider = ScriptedProvider::failing(Error::timeout("Request timed out", Some(30.0)));
        let proxy = proxy_with(provider.clone(), Some("k"));

        let err = proxy
            .handle(ChatRequest::new("Hello", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn malformed_provider_body_is_internal() {
        let provider = ScriptedProvider::replying(json!({"choices": "nope"}));
        let proxy = proxy_with(provider, Some("k"));
        let err = proxy
            .handle(ChatRequest::new("Hello", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
        assert_eq!(err.http_status(), 500);
    }
}
