use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Who authored a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing.
    User,

    /// The model.
    Assistant,
}

impl Sender {
    /// The short label shown in place of an avatar.
    pub fn avatar(self) -> &'static str {
        match self {
            Sender::User => "U",
            Sender::Assistant => "AI",
        }
    }
}

/// Opaque message identifier, increasing in creation order within a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single entry of a chat transcript.
///
/// Messages are immutable once created; the fields are read through
/// accessors so a session's history cannot be edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    content: String,
    sender: Sender,
    #[serde(with = "crate::utils::time")]
    created_at: OffsetDateTime,
}

impl Message {
    pub(crate) fn new(
        id: MessageId,
        content: impl Into<String>,
        sender: Sender,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            sender,
            created_at,
        }
    }

    /// The message identifier.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Plain text for user messages, markdown for assistant messages.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Who wrote the message.
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// When the message was created.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// The creation time formatted for display.
    pub fn timestamp(&self) -> String {
        crate::utils::time::display_clock(self.created_at)
    }

    /// Returns true for assistant-authored messages.
    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }
}
