//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::chat::commands::model_from_selector;
use crate::chat::transport::DEFAULT_PROXY_URL;
use crate::client::DEFAULT_TIMEOUT;
use crate::types::Model;

/// Command-line arguments for the chatbot-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the completion proxy.
    #[arrrg(optional, "Proxy base URL (default: http://127.0.0.1:3000/)", "URL")]
    pub proxy_url: Option<String>,

    /// Model to start the session with.
    #[arrrg(optional, "Model id or catalog number to start with", "MODEL")]
    pub model: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Seconds to wait for a reply (default: 30)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Resolved configuration for a chat front end.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Where the completion proxy listens.
    pub proxy_url: String,

    /// The model selected when the session starts.
    pub model: Model,

    /// How long to wait for the proxy before giving up on a turn.
    pub timeout: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Proxy: http://127.0.0.1:3000/
    /// - Model: the first catalog entry
    /// - Timeout: 30 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            model: Model::default(),
            timeout: DEFAULT_TIMEOUT,
            use_color: true,
        }
    }

    /// Sets the proxy URL.
    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = proxy_url.into();
        self
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        let model = args
            .model
            .map(|s| model_from_selector(s.trim()).unwrap_or(Model::Custom(s)))
            .unwrap_or(defaults.model);

        ChatConfig {
            proxy_url: args.proxy_url.unwrap_or(defaults.proxy_url),
            model,
            timeout: args
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            use_color: !args.no_color,
        }
    }
}
