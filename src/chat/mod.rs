//! Chat front end: the session controller and its terminal plumbing.
//!
//! The [`ChatSession`] owns the transcript, the pending flag and the selected
//! model.  It reaches the completion proxy through a [`CompletionTransport`],
//! which in production is a [`ProxyClient`] speaking HTTP.
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: conversation state and the send/receive cycle
//! - [`transport`]: the HTTP client for `POST /api/chat`
//! - [`commands`]: slash command parsing
//! - [`clipboard`]: copy-to-clipboard through the terminal

pub mod clipboard;
mod commands;
mod config;
mod session;
mod transport;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, Feedback, help_text, model_from_selector, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{
    CONNECTION_FALLBACK, ChatSession, Entry, GREETING, LOADING_PLACEHOLDER, PendingTurn,
};
pub use transport::{CompletionTransport, DEFAULT_PROXY_URL, ProxyClient};
