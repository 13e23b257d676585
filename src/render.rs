//! Output rendering for the chat front end.
//!
//! This module provides the renderer trait and a plain-text implementation
//! that prints chat bubbles, with assistant replies formatted as markdown.

use std::io::{self, Stdout, Write};

use crate::chat::{Entry, LOADING_PLACEHOLDER};
use crate::types::{Message, Sender};

mod markdown;

pub use markdown::render_markdown;

/// ANSI escape code for bold text (used for headings and labels).
pub(crate) const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for timestamps and the loading bubble).
pub(crate) const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for quotes and emphasis).
pub(crate) const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code for underlined text (used for links).
pub(crate) const ANSI_UNDERLINE: &str = "\x1b[4m";

/// ANSI escape code to reset all styling.
pub(crate) const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for code blocks).
pub(crate) const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for inline code).
pub(crate) const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for green text (used for the assistant label).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for blue text (used for the user label).
const ANSI_BLUE: &str = "\x1b[34m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Indentation of bubble bodies under their header.
const BODY_INDENT: &str = "    ";

/// Formats one message as a bubble: a header line and an indented body.
///
/// `number` is the message's 1-based position, used by `/copy` and the rating
/// commands.  User text is kept verbatim; assistant text is markdown.
pub fn format_message(number: usize, message: &Message, use_color: bool) -> Vec<String> {
    let label = message.sender().avatar();
    let header = if use_color {
        let color = match message.sender() {
            Sender::User => ANSI_BLUE,
            Sender::Assistant => ANSI_GREEN,
        };
        format!(
            "{ANSI_DIM}[{number}]{ANSI_RESET} {ANSI_BOLD}{color}{label:<2}{ANSI_RESET} {ANSI_DIM}{}{ANSI_RESET}",
            message.timestamp()
        )
    } else {
        format!("[{number}] {label:<2} {}", message.timestamp())
    };

    let body = match message.sender() {
        Sender::User => message.content().split('\n').map(str::to_string).collect(),
        Sender::Assistant => render_markdown(message.content(), use_color),
    };

    let mut lines = Vec::with_capacity(body.len() + 1);
    lines.push(header);
    for line in body {
        if line.is_empty() {
            lines.push(line);
        } else {
            lines.push(format!("{BODY_INDENT}{line}"));
        }
    }
    lines
}

/// Formats the transient loading bubble.
pub fn format_loading(use_color: bool) -> String {
    let label = Sender::Assistant.avatar();
    if use_color {
        format!("{ANSI_DIM}    {label:<2} {LOADING_PLACEHOLDER}{ANSI_RESET}")
    } else {
        format!("    {label:<2} {LOADING_PLACEHOLDER}")
    }
}

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
pub trait Renderer: Send {
    /// Print one message bubble.
    fn print_message(&mut self, number: usize, message: &Message);

    /// Show the loading bubble while a reply is pending.
    fn print_loading(&mut self);

    /// Remove the loading bubble, if the output supports it.
    fn clear_loading(&mut self) {}

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print every entry of a conversation view.
    fn print_entries(&mut self, entries: &[Entry<'_>]) {
        let mut number = 0;
        for entry in entries {
            match entry {
                Entry::Message(message) => {
                    number += 1;
                    self.print_message(number, message);
                }
                Entry::Loading => self.print_loading(),
            }
        }
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// This renderer writes bubbles to stdout (or any writer) with optional
/// ANSI escape codes for labels, timestamps, and markdown.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    loading_shown: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            loading_shown: false,
        }
    }

    /// Returns true if ANSI styling is enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Consumes the renderer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_lines(&mut self, lines: &[String]) {
        for line in lines {
            let _ = writeln!(self.out, "{line}");
        }
        let _ = self.out.flush();
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_message(&mut self, number: usize, message: &Message) {
        let mut lines = format_message(number, message, self.use_color);
        lines.push(String::new());
        self.write_lines(&lines);
    }

    fn print_loading(&mut self) {
        let line = format_loading(self.use_color);
        if self.use_color {
            // Left without a newline so clear_loading can erase it.
            let _ = write!(self.out, "{line}");
            let _ = self.out.flush();
        } else {
            self.write_lines(&[line]);
        }
        self.loading_shown = true;
    }

    fn clear_loading(&mut self) {
        if self.loading_shown && self.use_color {
            let _ = write!(self.out, "\r\x1b[2K");
            let _ = self.out.flush();
        }
        self.loading_shown = false;
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            self.write_lines(&[format!("{ANSI_RED}Error: {error}{ANSI_RESET}")]);
        } else {
            self.write_lines(&[format!("Error: {error}")]);
        }
    }

    fn print_info(&mut self, info: &str) {
        self.write_lines(&[info.to_string()]);
    }
}
