//! Error types for the chatbot relay.
//!
//! One error type covers both halves of the system: the completion proxy,
//! which has to translate failures into a fixed HTTP contract, and the chat
//! front end, which only needs to know that a turn failed.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// Public message returned when the request is missing `message` or `model`.
pub const INVALID_REQUEST_MESSAGE: &str = "Message and model are required";

/// Public message returned when no provider credential is configured.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "OpenRouter API key not configured";

/// Public message returned when the provider rejects a completion.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to get AI response";

/// Public message returned for every other failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// The main error type for the chatbot crate.
#[derive(Clone, Debug)]
pub enum Error {
    /// The inbound request omitted a required field.
    InvalidRequest {
        /// Human-readable error message.
        message: String,
        /// Field that failed validation.
        param: Option<String>,
    },

    /// The deployment is misconfigured.
    Configuration {
        /// Human-readable error message.
        message: String,
    },

    /// The completion provider answered with a non-success status.
    Upstream {
        /// HTTP status code returned by the provider.
        status_code: u16,
        /// Raw provider response body.  Logged, never returned to clients.
        body: String,
    },

    /// The outbound request timed out.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Connection error.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON or YAML serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// Anything else.
    Internal {
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Creates a new invalid request error.
    pub fn invalid_request(message: impl Into<String>, param: Option<String>) -> Self {
        Error::InvalidRequest {
            message: message.into(),
            param,
        }
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new upstream error.
    pub fn upstream(status_code: u16, body: impl Into<String>) -> Self {
        Error::Upstream {
            status_code,
            body: body.into(),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error is an invalid request.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Error::InvalidRequest { .. })
    }

    /// Returns true if this error is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// Returns true if this error came from the completion provider.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream { .. })
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns the provider status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Upstream { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns the HTTP status the proxy answers with for this error.
    ///
    /// Provider statuses are passed through; anything that is not a valid
    /// error status collapses to 500.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidRequest { .. } => 400,
            Error::Upstream { status_code, .. } if (400..=599).contains(status_code) => {
                *status_code
            }
            _ => 500,
        }
    }

    /// Returns the message the proxy is allowed to show a client.
    pub fn public_message(&self) -> &'static str {
        match self {
            Error::InvalidRequest { .. } => INVALID_REQUEST_MESSAGE,
            Error::Configuration { .. } => MISSING_CREDENTIAL_MESSAGE,
            Error::Upstream { .. } => UPSTREAM_FAILURE_MESSAGE,
            _ => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRequest { message, param } => {
                if let Some(param) = param {
                    write!(f, "Invalid request: {message} (parameter: {param})")
                } else {
                    write!(f, "Invalid request: {message}")
                }
            }
            Error::Configuration { message } => {
                write!(f, "Configuration error: {message}")
            }
            Error::Upstream { status_code, body } => {
                if body.is_empty() {
                    write!(f, "Upstream error: status {status_code}")
                } else {
                    write!(f, "Upstream error: status {status_code}: {body}")
                }
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
            Error::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::serialization(format!("YAML error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// Maps a reqwest failure onto the crate error, keeping timeouts and
/// connection failures distinguishable.
pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: f64) -> Error {
    if err.is_timeout() {
        Error::timeout(format!("Request timed out: {err}"), Some(timeout_secs))
    } else if err.is_connect() {
        Error::connection(format!("Connection error: {err}"), Some(Box::new(err)))
    } else if err.is_decode() {
        Error::serialization(
            format!("Failed to parse response: {err}"),
            Some(Box::new(err)),
        )
    } else {
        Error::http_client(format!("Request failed: {err}"), Some(Box::new(err)))
    }
}

/// A specialized Result type for chatbot operations.
pub type Result<T> = std::result::Result<T, Error>;
