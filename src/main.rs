use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use tagvi::config::Config;
use tagvi::gemini::GeminiClient;
use tagvi::{chat, web_server};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the web server hosting the chat page.
    Serve {
        #[arg(long, default_value_t = 9900, help = "Port for the web server.")]
        port: u16,
    },
    /// Chat with the agent in the terminal.
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,tagvi=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // A missing credential halts startup before any front-end comes up.
    let config = Config::from_env().context("Startup configuration failed")?;
    let generator = Arc::new(GeminiClient::new(&config));

    match cli.command {
        Commands::Serve { port } => {
            info!(model = %config.model, "Starting web server on port {}", port);

            let mut server = tokio::spawn(web_server::start_web_server(port, generator));

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, shutting down");
                    server.abort();
                }
                res = &mut server => {
                    res.context("Web server task failed")??;
                }
            }
        }
        Commands::Chat => {
            chat::run_chat(generator).await.context("Chat session failed")?;
            info!("Chat session finished.");
        }
    }

    Ok(())
}
