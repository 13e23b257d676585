//! Configuration for the completion proxy server.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! the environment, then command-line flags.  The provider credential is
//! only ever read from the environment.

use std::fmt;
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::{Deserialize, Serialize};
use url::Url;
use utf8path::Path;

use crate::client::{DEFAULT_API_URL, DEFAULT_SITE_URL, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
/// Environment variable holding the referer sent to the provider.
pub const SITE_URL_ENV: &str = "YOUR_SITE_URL";
/// Environment variable overriding the provider base URL.
pub const BASE_URL_ENV: &str = "OPENROUTER_BASE_URL";
/// Environment variable overriding the listen host.
pub const HOST_ENV: &str = "CHATBOT_HOST";
/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "CHATBOT_PORT";

/// Sampling temperature sent with every completion.
pub const TEMPERATURE: f32 = 0.7;
/// Token limit sent with every completion.
pub const MAX_TOKENS: u32 = 1000;

/// A provider credential.  `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a credential.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The secret itself, for building the authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Command-line arguments for the chatbot-server tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ServerArgs {
    /// Path to a YAML configuration file.
    #[arrrg(optional, "YAML configuration file", "PATH")]
    pub config: Option<String>,

    /// Address to listen on.
    #[arrrg(optional, "Listen host (default: 127.0.0.1)", "HOST")]
    pub host: Option<String>,

    /// Port to listen on.
    #[arrrg(optional, "Listen port (default: 3000)", "PORT")]
    pub port: Option<u16>,

    /// Referer sent to the provider.
    #[arrrg(optional, "Site URL sent as HTTP-Referer", "URL")]
    pub site_url: Option<String>,

    /// Provider base URL.
    #[arrrg(optional, "Provider base URL (default: https://openrouter.ai/api/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Outbound request timeout.
    #[arrrg(optional, "Provider timeout in seconds (default: 30)", "SECONDS")]
    pub timeout_secs: Option<u64>,
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to listen on.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Referer sent to the provider.
    pub site_url: String,

    /// Provider base URL.
    pub base_url: String,

    /// Outbound request timeout in seconds.
    pub timeout_secs: u64,

    /// Provider credential.  Absent until read from the environment.
    #[serde(skip)]
    pub api_key: Option<ApiKey>,
}

impl ServerConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            site_url: DEFAULT_SITE_URL.to_string(),
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            api_key: None,
        }
    }

    /// Resolve the full configuration for the server binary.
    pub fn load(args: ServerArgs) -> Result<Self> {
        Self::load_with_env(args, |key| std::env::var(key).ok())
    }

    /// Resolve the configuration against an arbitrary environment lookup.
    pub fn load_with_env<F>(args: ServerArgs, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match args.config.as_deref() {
            Some(path) => Self::from_file(Path::from(path))?,
            None => Self::new(),
        };
        config.apply_env(env)?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a YAML file.  Missing keys keep their defaults.
    pub fn from_file(path: Path<'_>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_str()).map_err(|err| {
            Error::io(format!("failed to read config file {}", path.as_str()), err)
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        if let Some(host) = non_empty(HOST_ENV) {
            self.host = host;
        }
        if let Some(port) = non_empty(PORT_ENV) {
            self.port = port.trim().parse().map_err(|_| {
                Error::configuration(format!("{PORT_ENV} is not a valid port: {port}"))
            })?;
        }
        if let Some(site_url) = non_empty(SITE_URL_ENV) {
            self.site_url = site_url;
        }
        if let Some(base_url) = non_empty(BASE_URL_ENV) {
            self.base_url = base_url;
        }
        self.api_key = non_empty(API_KEY_ENV).map(ApiKey::new);
        Ok(())
    }

    fn apply_args(&mut self, args: ServerArgs) {
        if let Some(host) = args.host {
            self.host = host;
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(site_url) = args.site_url {
            self.site_url = site_url;
        }
        if let Some(base_url) = args.base_url {
            self.base_url = base_url;
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)?;
        Url::parse(&self.site_url)?;
        if self.timeout_secs == 0 {
            return Err(Error::configuration("timeout_secs must be at least 1"));
        }
        Ok(())
    }

    /// Outbound request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The `host:port` pair to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
