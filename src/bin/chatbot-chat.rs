//! Interactive terminal chat against a running completion proxy.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a proxy on the default address
//! chatbot-chat
//!
//! # Point at another proxy and start with a different model
//! chatbot-chat --proxy-url http://10.0.0.2:3000 --model google/gemma-3n-e2b-it:free
//!
//! # Disable colors (useful for piping output)
//! chatbot-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/models` - List the models
//! - `/model <n|id>` - Change the model
//! - `/copy [n]` - Copy a message to the clipboard
//! - `/good [n]`, `/bad [n]` - Rate a reply
//! - `/history` - Show the conversation
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use chatbot::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, CompletionTransport, Feedback,
    PlainTextRenderer, ProxyClient, Renderer, clipboard, help_text, parse_command,
};
use chatbot::types::{ModelCatalog, ModelOption};

/// Main entry point for the chatbot-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr and stay quiet unless RUST_LOG asks for them.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chatbot=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("chatbot-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    let client = ProxyClient::new(&config.proxy_url, config.timeout)?;
    let mut session = ChatSession::new(config.model.clone());
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    let banner = format!("proxy: {}, model: {}", client.base_url(), session.model());
    println!("AI ChatBot ({banner})");
    println!("Type /help for commands, /quit to exit\n");
    renderer.print_entries(&session.entries());

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                session.set_input(line.as_str());
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);

                if let Some(cmd) = parse_command(trimmed) {
                    session.set_input("");
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Models => {
                            let catalog = match client.models().await {
                                Ok(catalog) => catalog,
                                Err(err) => {
                                    tracing::warn!(
                                        error = %err,
                                        "falling back to built-in model list"
                                    );
                                    ModelCatalog::builtin()
                                }
                            };
                            print_models(&catalog.models, session.model().id());
                        }
                        ChatCommand::Model(model) => {
                            let name = model.display_name();
                            renderer.print_info(&format!("Model changed to: {name} ({model})"));
                            session.select_model(model);
                        }
                        ChatCommand::Copy(number) => {
                            let message = match number {
                                Some(number) => session.message_at(number),
                                None => session.last_reply(),
                            };
                            match message {
                                Some(message) => {
                                    if clipboard::copy_message(message.content()) {
                                        renderer.print_info("Copied to clipboard.");
                                    } else {
                                        renderer.print_error("Could not copy to clipboard.");
                                    }
                                }
                                None => renderer.print_error("No such message."),
                            }
                        }
                        ChatCommand::Rate(feedback, number) => {
                            match session.rate(number, feedback) {
                                Some(_) => renderer.print_info(match feedback {
                                    Feedback::Good => "Thanks for the feedback!",
                                    Feedback::Bad => "Thanks, noted.",
                                }),
                                None => renderer.print_error("No such assistant message."),
                            }
                        }
                        ChatCommand::History => {
                            renderer.print_entries(&session.entries());
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                send(&mut session, &client, &mut renderer).await;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Sends the input buffer, showing the loading bubble until the reply lands.
async fn send(
    session: &mut ChatSession,
    transport: &dyn CompletionTransport,
    renderer: &mut dyn Renderer,
) {
    let text = session.input().to_string();
    let Some(turn) = session.begin_turn(&text) else {
        return;
    };
    let number = session.message_count();
    renderer.print_loading();
    let outcome = transport.send(turn.request()).await;
    renderer.clear_loading();
    let reply = session.finish_turn(turn, outcome);
    renderer.print_message(number + 1, reply);
}

fn print_models(models: &[ModelOption], selected: &str) {
    println!("    Models:");
    for (index, option) in models.iter().enumerate() {
        let marker = if option.id == selected { "*" } else { " " };
        let number = index + 1;
        println!("    {marker} {number}. {} ({})", option.name, option.id);
    }
}
