//! HTTP server hosting the completion proxy.
//!
//! # Usage
//!
//! ```bash
//! # Serve on 127.0.0.1:3000 with the credential from the environment
//! OPENROUTER_API_KEY=sk-or-... chatbot-server
//!
//! # Listen elsewhere and read defaults from a file
//! chatbot-server --config chatbot.yaml --host 0.0.0.0 --port 8080
//! ```
//!
//! Set `RUST_LOG` to adjust logging, e.g. `RUST_LOG=chatbot=debug`.

use arrrg::CommandLine;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use chatbot::config::{ServerArgs, ServerConfig};
use chatbot::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chatbot=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let (args, free) = ServerArgs::from_command_line_relaxed("chatbot-server [OPTIONS]");
    if !free.is_empty() {
        tracing::warn!("ignoring unexpected arguments: {}", free.join(" "));
    }

    let config = match ServerConfig::load(args) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        address = %config.bind_address(),
        provider = %config.base_url,
        timeout_secs = config.timeout_secs,
        "starting chatbot proxy"
    );

    server::start_server(config).await?;
    Ok(())
}
