//! End-to-end tests: chat session → proxy over HTTP → fake provider over HTTP.
//! Both servers bind ephemeral ports on loopback; nothing leaves the machine.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Json, Response};
    use axum::routing::post;
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use chatbot::chat::{CONNECTION_FALLBACK, ChatSession, ProxyClient};
    use chatbot::config::ServerConfig;
    use chatbot::server::{self, AppState};
    use chatbot::types::{KnownModel, Model, ModelCatalog, Sender};
    use chatbot::{ApiKey, ChatRequest};

    #[derive(Clone)]
    struct FakeProvider {
        status: StatusCode,
        reply: Value,
        seen: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
    }

    impl FakeProvider {
        fn new(status: StatusCode, reply: Value) -> Self {
            Self {
                status,
                reply,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn requests(&self) -> Vec<(HeaderMap, Value)> {
            self.seen.lock().unwrap().clone()
        }
    }

    async fn completions(
        State(fake): State<FakeProvider>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        fake.seen.lock().unwrap().push((headers, body));
        (fake.status, Json(fake.reply.clone())).into_response()
    }

    async fn spawn_provider(fake: FakeProvider) -> SocketAddr {
        let app = Router::new()
            .route("/api/v1/chat/completions", post(completions))
            .with_state(fake);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn spawn_proxy(provider: SocketAddr, api_key: Option<&str>) -> SocketAddr {
        let config = ServerConfig {
            base_url: format!("http://{provider}/api/v1/"),
            timeout_secs: 5,
            api_key: api_key.map(ApiKey::new),
            ..ServerConfig::new()
        };
        let state = AppState::from_config(&config).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            server::serve(listener, state, std::future::pending::<()>())
                .await
                .unwrap();
        });
        addr
    }

    fn client(proxy: SocketAddr) -> ProxyClient {
        ProxyClient::new(
            &format!("http://{proxy}/"),
            std::time::Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn hello_round_trip() {
        let fake = FakeProvider::new(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": "Hi there!"}}]}),
        );
        let provider = spawn_provider(fake.clone()).await;
        let proxy = spawn_proxy(provider, Some("sk-or-test")).await;
        let client = client(proxy);

        let mut session = ChatSession::default();
        session.select_model(Model::Known(KnownModel::Gemma3nE2b));
        let reply = session.send_message(&client, "Hello").await.unwrap();
        assert_eq!(reply.content(), "Hi there!");

        let last = session.messages().last().unwrap();
        assert_eq!(last.sender(), Sender::Assistant);
        assert_eq!(last.content(), "Hi there!");
        assert_eq!(session.message_count(), 3);
        assert!(!session.is_pending());

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        let (headers, body) = &requests[0];
        assert_eq!(headers["authorization"], "Bearer sk-or-test");
        assert_eq!(headers["http-referer"], "http://localhost:3000");
        assert_eq!(headers["x-title"], "AI ChatBot");
        assert_eq!(body["model"], "google/gemma-3n-e2b-it:free");
        assert_eq!(
            body["messages"],
            json!([{"role": "user", "content": "Hello"}])
        );
        assert_eq!(body["max_tokens"], 1000);
        let temperature = body["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn provider_error_becomes_session_fallback() {
        let fake = FakeProvider::new(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "Rate limit exceeded"}}),
        );
        let provider = spawn_provider(fake.clone()).await;
        let proxy = spawn_proxy(provider, Some("sk-or-test")).await;
        let client = client(proxy);

        let mut session = ChatSession::default();
        let reply = session.send_message(&client, "Hello").await.unwrap();
        assert_eq!(reply.content(), CONNECTION_FALLBACK);
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn proxy_reports_upstream_status() {
        let fake = FakeProvider::new(StatusCode::PAYMENT_REQUIRED, json!({"error": "credits"}));
        let provider = spawn_provider(fake).await;
        let proxy = spawn_proxy(provider, Some("sk-or-test")).await;

        let response = reqwest::Client::new()
            .post(format!("http://{proxy}/api/chat"))
            .json(&ChatRequest::new("Hello", "x"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 402);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": "Failed to get AI response"}));
    }

    #[tokio::test]
    async fn missing_credential_never_reaches_provider() {
        let fake = FakeProvider::new(StatusCode::OK, json!({"choices": []}));
        let provider = spawn_provider(fake.clone()).await;
        let proxy = spawn_proxy(provider, None).await;

        let response = reqwest::Client::new()
            .post(format!("http://{proxy}/api/chat"))
            .json(&ChatRequest::new("Hello", "x"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": "OpenRouter API key not configured"}));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn models_are_served() {
        let fake = FakeProvider::new(StatusCode::OK, json!({}));
        let provider = spawn_provider(fake).await;
        let proxy = spawn_proxy(provider, None).await;

        let catalog = client(proxy).models().await.unwrap();
        assert_eq!(catalog, ModelCatalog::builtin());
    }
}
