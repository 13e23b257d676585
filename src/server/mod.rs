//! HTTP surface of the completion proxy.
//!
//! - [`routes`]: the route table
//! - [`handlers`]: request handlers and error translation
//! - [`serve`]: listener and graceful shutdown

pub mod handlers;
pub mod routes;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::client::OpenRouter;
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::proxy::{CompletionProxy, ProxySettings};
use crate::types::ModelCatalog;

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub proxy: CompletionProxy,
    pub catalog: Arc<ModelCatalog>,
}

impl AppState {
    /// State over an arbitrary proxy with the built-in model catalog.
    pub fn new(proxy: CompletionProxy) -> Self {
        Self {
            proxy,
            catalog: Arc::new(ModelCatalog::builtin()),
        }
    }

    /// State for a deployment: an OpenRouter client configured from `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let provider = OpenRouter::with_options(
            Some(&config.base_url),
            Some(config.site_url.clone()),
            Some(config.timeout()),
        )?;
        let proxy = CompletionProxy::new(Arc::new(provider), ProxySettings::from(config));
        Ok(Self::new(proxy))
    }
}

/// Build the application router with request tracing.
pub fn create_app(state: AppState) -> Router {
    routes::create_routes(state).layer(TraceLayer::new_for_http())
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("listening on http://{}", addr);
    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|err| Error::io("server terminated", err))
}

/// Bind the configured address and serve until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    if config.api_key.is_none() {
        tracing::warn!(
            "{} is not set; chat requests will fail until it is configured",
            crate::config::API_KEY_ENV
        );
    }
    let state = AppState::from_config(&config)?;
    let listener = TcpListener::bind(config.bind_address())
        .await
        .map_err(|err| Error::io(format!("failed to bind {}", config.bind_address()), err))?;
    serve(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down"),
        Err(err) => tracing::error!("failed to listen for Ctrl+C: {}", err),
    }
}
