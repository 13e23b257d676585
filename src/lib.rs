// Public modules
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod observability;
pub mod proxy;
pub mod render;
pub mod server;
pub mod types;
pub mod utils;

// Re-exports
pub use client::OpenRouter;
pub use config::{ApiKey, ServerArgs, ServerConfig};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use proxy::{CompletionProvider, CompletionProxy, ProxySettings};
pub use types::*;
