//! Request handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{Value, json};

use super::AppState;
use crate::error::Error;
use crate::types::{ChatRequest, ErrorBody, ModelCatalog};

/// `POST /api/chat`
///
/// The body is parsed by hand so that a missing or mistyped field is a 400
/// while a body that is not JSON at all is a 500.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match parse_chat_request(&body) {
        Ok(request) => request,
        Err(err) => return state.proxy.reject(err).into_response(),
    };
    match state.proxy.handle(request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// `GET /api/models`
pub async fn models(State(state): State<AppState>) -> Json<ModelCatalog> {
    Json(state.catalog.as_ref().clone())
}

/// `GET /health`
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "chatbot",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

fn parse_chat_request(body: &[u8]) -> Result<ChatRequest, Error> {
    let value: Value = serde_json::from_slice(body)?;
    let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
    Ok(ChatRequest {
        message: field("message"),
        model: field("model"),
    })
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.public_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::proxy::tests::{ScriptedProvider, proxy_with};
    use crate::server::create_app;

    fn app(provider: Arc<ScriptedProvider>, key: Option<&str>) -> axum::Router {
        create_app(AppState::new(proxy_with(provider, key)))
    }

    fn hi() -> Value {
        json!({"choices": [{"message": {"content": "Hi"}}]})
    }

    async fn post_chat(app: axum::Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn chat_success() {
        let provider = ScriptedProvider::replying(hi());
        let (status, body) = post_chat(
            app(provider.clone(), Some("k")),
            r#"{"message":"Hello","model":"google/gemma-3n-e2b-it:free"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Hi"}));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn chat_missing_fields_is_400() {
        for body in [
            r#"{"message":"","model":"x"}"#,
            r#"{"model":""}"#,
            r#"{}"#,
            r#"{"message":"hi","model":7}"#,
        ] {
            let provider = ScriptedProvider::replying(hi());
            let (status, reply) = post_chat(app(provider.clone(), Some("k")), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(reply, json!({"error": "Message and model are required"}));
            assert_eq!(provider.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn chat_without_credential_is_500() {
        let provider = ScriptedProvider::replying(hi());
        let (status, reply) = post_chat(
            app(provider.clone(), None),
            r#"{"message":"Hello","model":"x"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply, json!({"error": "OpenRouter API key not configured"}));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn chat_upstream_failure_keeps_status_and_hides_detail() {
        let provider = ScriptedProvider::failing(Error::upstream(
            429,
            r#"{"error":"rate limited: key sk-or"}"#,
        ));
        let (status, reply) = post_chat(
            app(provider, Some("k")),
            r#"{"message":"Hello","model":"x"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(reply, json!({"error": "Failed to get AI response"}));
    }

    #[tokio::test]
    async fn chat_empty_choices_falls_back() {
        let provider = ScriptedProvider::replying(json!({"choices": []}));
        let (status, reply) = post_chat(
            app(provider, Some("k")),
            r#"{"message":"Hello","model":"x"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            reply,
            json!({"message": "Sorry, I could not generate a response."})
        );
    }

    #[tokio::test]
    async fn chat_non_json_body_is_internal_error() {
        let provider = ScriptedProvider::replying(hi());
        let (status, reply) = post_chat(app(provider.clone(), Some("k")), "not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply, json!({"error": "Internal server error"}));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn models_lists_catalog() {
        let response = app(ScriptedProvider::replying(hi()), Some("k"))
            .oneshot(
                Request::builder()
                    .uri("/api/models")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let catalog: ModelCatalog = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(catalog.models.len(), 8);
        assert_eq!(catalog.models[1].name, "Gemma 3N E2B");
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let response = app(ScriptedProvider::replying(hi()), None)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
    }
}
