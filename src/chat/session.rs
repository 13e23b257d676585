//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the transcript,
//! the pending flag and the selected model for one conversation.  A session
//! lives as long as the front end that created it; nothing is persisted.

use time::OffsetDateTime;

use crate::chat::commands::Feedback;
use crate::chat::transport::CompletionTransport;
use crate::error::Result;
use crate::observability::{SESSION_FAILED_TURNS, SESSION_TURNS};
use crate::types::{ChatRequest, Message, MessageId, Model, Sender};
use crate::utils::time::now;

/// The assistant message every session starts with.
pub const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

/// Shown in place of a reply when the proxy cannot be reached or fails.
pub const CONNECTION_FALLBACK: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";

/// Text of the transient bubble shown while a reply is pending.
pub const LOADING_PLACEHOLDER: &str = "Thinking...";

/// One row of the rendered conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    /// A stored message.
    Message(&'a Message),
    /// The loading bubble.  Never stored; derived from the pending flag.
    Loading,
}

/// A request that has been recorded locally but not yet answered.
///
/// Only [`ChatSession::begin_turn`] creates one, and
/// [`ChatSession::finish_turn`] consumes it, so each accepted send produces
/// exactly one reply.
#[derive(Debug)]
#[must_use = "a pending turn must be finished or the session stays pending"]
pub struct PendingTurn {
    request: ChatRequest,
    user_message: MessageId,
}

impl PendingTurn {
    /// The request to send, carrying the model selected at send time.
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    /// The user message this turn answers.
    pub fn user_message(&self) -> MessageId {
        self.user_message
    }
}

/// A chat session that manages conversation state.
pub struct ChatSession {
    messages: Vec<Message>,
    pending: bool,
    selected_model: Model,
    input: String,
    next_id: u64,
}

impl ChatSession {
    /// Creates a new session seeded with the assistant greeting.
    pub fn new(model: Model) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            pending: false,
            selected_model: model,
            input: String::new(),
            next_id: 1,
        };
        session.push(Sender::Assistant, GREETING.to_string());
        session
    }

    /// The transcript in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of stored messages.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// True while a reply is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.selected_model
    }

    /// Changes the model used for subsequent requests.
    ///
    /// A turn already in flight keeps the model it was started with.
    pub fn select_model(&mut self, model: Model) {
        self.selected_model = model;
    }

    /// The input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Returns true if `submit` would send something right now.
    pub fn can_send(&self) -> bool {
        !self.pending && !self.input.trim().is_empty()
    }

    /// The conversation as it should be drawn, including the loading bubble.
    pub fn entries(&self) -> Vec<Entry<'_>> {
        let mut entries: Vec<Entry<'_>> = self.messages.iter().map(Entry::Message).collect();
        let awaiting_reply = self
            .messages
            .last()
            .is_some_and(|message| message.sender() == Sender::User);
        if self.pending && awaiting_reply {
            entries.push(Entry::Loading);
        }
        entries
    }

    /// Records a user message and marks the session pending.
    ///
    /// Returns `None` without touching any state if `text` is blank or a
    /// reply is already outstanding.
    pub fn begin_turn(&mut self, text: &str) -> Option<PendingTurn> {
        if self.pending || text.trim().is_empty() {
            return None;
        }
        let user_message = self.push(Sender::User, text.to_string());
        self.pending = true;
        self.input.clear();
        SESSION_TURNS.click();
        Some(PendingTurn {
            request: ChatRequest::new(text, self.selected_model.id()),
            user_message,
        })
    }

    /// Appends the reply for `turn` and clears the pending flag.
    ///
    /// Failures are logged and replaced by [`CONNECTION_FALLBACK`].
    pub fn finish_turn(&mut self, turn: PendingTurn, outcome: Result<String>) -> &Message {
        let content = match outcome {
            Ok(content) => content,
            Err(err) => {
                SESSION_FAILED_TURNS.click();
                tracing::warn!(
                    error = %err,
                    message_id = %turn.user_message,
                    "chat request failed"
                );
                CONNECTION_FALLBACK.to_string()
            }
        };
        let index = self.messages.len();
        self.push(Sender::Assistant, content);
        self.pending = false;
        &self.messages[index]
    }

    /// Sends `text` through `transport` and appends the reply.
    ///
    /// Returns the appended assistant message, or `None` if the send was
    /// rejected (blank text or a reply already pending).
    pub async fn send_message(
        &mut self,
        transport: &dyn CompletionTransport,
        text: &str,
    ) -> Option<&Message> {
        let turn = self.begin_turn(text)?;
        let outcome = transport.send(turn.request()).await;
        Some(self.finish_turn(turn, outcome))
    }

    /// Sends the input buffer.  See [`ChatSession::send_message`].
    pub async fn submit(&mut self, transport: &dyn CompletionTransport) -> Option<&Message> {
        let text = self.input.clone();
        self.send_message(transport, &text).await
    }

    /// Looks up a message by its 1-based position in the transcript.
    pub fn message_at(&self, number: usize) -> Option<&Message> {
        number
            .checked_sub(1)
            .and_then(|index| self.messages.get(index))
    }

    /// The most recent assistant message.
    pub fn last_reply(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.is_assistant())
    }

    /// Records a rating for an assistant message.
    ///
    /// Ratings are logged, not stored.  Returns the rated message, or `None`
    /// if `number` does not name an assistant message.
    pub fn rate(&self, number: Option<usize>, feedback: Feedback) -> Option<&Message> {
        let message = match number {
            Some(number) => self.message_at(number).filter(|m| m.is_assistant())?,
            None => self.last_reply()?,
        };
        tracing::info!(
            message_id = %message.id(),
            model = %self.selected_model,
            feedback = ?feedback,
            "reply rated"
        );
        Some(message)
    }

    fn push(&mut self, sender: Sender, content: String) -> MessageId {
        let id = MessageId::new(self.next_id);
        self.next_id += 1;
        let created_at = self.next_timestamp();
        self.messages
            .push(Message::new(id, content, sender, created_at));
        id
    }

    /// The current time, clamped so timestamps never run backwards.
    fn next_timestamp(&self) -> OffsetDateTime {
        let current = now();
        match self.messages.last() {
            Some(last) if last.created_at() > current => last.created_at(),
            _ => current,
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(Model::default())
    }
}
