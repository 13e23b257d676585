//! Slash command parsing for the chat front end.
//!
//! Commands start with `/` and act on the local session; they are never sent
//! to the proxy.

use crate::types::{KnownModel, Model};

/// A rating attached to an assistant message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Thumbs up.
    Good,
    /// Thumbs down.
    Bad,
}

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// List the selectable models.
    Models,

    /// Select a model by catalog number or identifier.
    Model(Model),

    /// Copy a message to the clipboard.
    /// `None` means the most recent assistant message.
    Copy(Option<usize>),

    /// Rate an assistant message.
    /// `None` means the most recent assistant message.
    Rate(Feedback, Option<usize>),

    /// Re-render the whole conversation.
    History,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be sent as a message.
///
/// # Examples
///
/// ```
/// # use chatbot::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/model 2").is_some());
/// assert!(parse_command("Hello!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "models" => ChatCommand::Models,
        "model" => match argument {
            Some(arg) => parse_model_selector(arg),
            None => ChatCommand::Invalid("/model requires a number or model id".to_string()),
        },
        "copy" => match parse_message_number(argument, "/copy") {
            Ok(number) => ChatCommand::Copy(number),
            Err(message) => ChatCommand::Invalid(message),
        },
        "good" | "up" => match parse_message_number(argument, "/good") {
            Ok(number) => ChatCommand::Rate(Feedback::Good, number),
            Err(message) => ChatCommand::Invalid(message),
        },
        "bad" | "down" => match parse_message_number(argument, "/bad") {
            Ok(number) => ChatCommand::Rate(Feedback::Bad, number),
            Err(message) => ChatCommand::Invalid(message),
        },
        "history" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_model_selector(arg: &str) -> ChatCommand {
    match model_from_selector(arg) {
        Ok(model) => ChatCommand::Model(model),
        Err(message) => ChatCommand::Invalid(message),
    }
}

/// Resolves a 1-based catalog number or a model identifier to a [`Model`].
pub fn model_from_selector(arg: &str) -> Result<Model, String> {
    if let Ok(number) = arg.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|index| KnownModel::ALL.get(index))
            .map(|known| Model::Known(*known))
            .ok_or_else(|| {
                format!(
                    "/model expects a number between 1 and {}",
                    KnownModel::ALL.len()
                )
            });
    }
    Ok(Model::from(arg))
}

fn parse_message_number(argument: Option<&str>, name: &str) -> Result<Option<usize>, String> {
    match argument {
        None => Ok(None),
        Some(arg) => match arg.parse::<usize>() {
            Ok(number) if number > 0 => Ok(Some(number)),
            _ => Err(format!("{name} expects a message number from /history")),
        },
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /models                List the available models
  /model <n|id>          Select a model by number or identifier
  /copy [n]              Copy a message to the clipboard (default: last reply)
  /good [n]              Rate a reply as helpful (default: last reply)
  /bad [n]               Rate a reply as unhelpful (default: last reply)
  /history               Show the whole conversation with message numbers
  /help                  Show this help message
  /quit                  Exit the chat
Enter sends the message."#
}
