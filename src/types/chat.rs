use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
///
/// Both fields are required by the proxy, but they are optional here so that
/// a request missing either one is reported as an invalid request rather than
/// a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Identifier of the model to answer with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatRequest {
    /// Create a request carrying both fields.
    pub fn new(message: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            model: Some(model.into()),
        }
    }
}

/// Successful reply from `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The assistant's markdown text.
    pub message: String,
}

/// Error reply from `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// A fixed, client-safe description of the failure.
    pub error: String,
}
