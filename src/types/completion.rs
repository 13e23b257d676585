//! Wire types for the provider's OpenAI-compatible `chat/completions` endpoint.
//!
//! Only the fields the relay sends or reads are modeled; unknown response
//! fields are ignored.

use serde::{Deserialize, Serialize};

/// Role type for a completion message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionRole {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// A single message in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    /// The role of the message.
    pub role: CompletionRole,

    /// The text of the message.
    pub content: String,
}

impl CompletionMessage {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: CompletionRole::User,
            content: content.into(),
        }
    }
}

/// Body of the outbound completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Provider model identifier.
    pub model: String,

    /// Conversation so far.  The relay always sends exactly one user message.
    pub messages: Vec<CompletionMessage>,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a single-turn request.
    pub fn single_turn(
        model: impl Into<String>,
        content: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![CompletionMessage::user(content)],
            temperature,
            max_tokens,
        }
    }
}

/// The parts of a completion response the relay reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Candidate completions.  A success body without `choices` reads as
    /// empty, which the proxy answers with its fallback reply.
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

/// One candidate completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    /// The generated message, if the provider returned one.
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

/// The generated message within a choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    /// Generated text; providers send `null` for some refusals.
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Returns `choices[0].message.content` when it is present and non-empty.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}
