//! chat-relay - Streaming relay between a browser chat UI and LLM providers
//!
//! A small server that accepts a conversation plus a provider selector,
//! forwards it to the configured upstream with streaming enabled, and
//! re-frames the upstream SSE response into a raw token stream.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_relay::config::Config;
use chat_relay::relay;

#[derive(Parser)]
#[command(name = "chat-relay")]
#[command(about = "Streaming relay between a browser chat UI and LLM providers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// Override listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Validate configuration file
    Check {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },

    /// Show configured providers
    Providers {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, listen } => {
            tracing::info!(config = %config, "Loading configuration");
            let (mut config, key_sources) = Config::from_file_with_env(&config)?;

            for (provider, source) in &key_sources {
                tracing::info!(provider = %provider, key_source = %source, "Resolved provider key");
            }

            if let Some(addr) = listen {
                tracing::info!(listen = %addr, "Override listen address");
                config.server.listen = addr;
            }

            relay::run_server(config).await
        }

        Commands::Check { config } => {
            let (parsed, key_sources) = Config::from_file_with_env(&config)?;

            println!("Configuration OK: {}", config);
            println!("  listen: {}", parsed.server.listen);
            println!("  static_dir: {}", parsed.server.static_dir);
            for (provider, source) in &key_sources {
                println!("  provider '{}': key from {}", provider, source);
            }
            Ok(())
        }

        Commands::Providers { config } => {
            let (parsed, _) = Config::from_file_with_env(&config)?;

            if parsed.providers.is_empty() {
                println!("No providers configured");
                return Ok(());
            }
            for provider in &parsed.providers {
                println!("{}\t{}\t{}", provider.name, provider.model, provider.url);
            }
            Ok(())
        }
    }
}
