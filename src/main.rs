//! chat-relay - Streaming chat relay with model-fallback probing
//!
//! A small HTTP service that finds a model the caller's key can use,
//! then streams that model's answer back as plain text.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_relay::config::Config;

#[derive(Parser)]
#[command(name = "chat-relay")]
#[command(about = "Streaming chat relay with model-fallback probing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<String>,

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

    /// Show candidate models in probe order
    Models {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("chat_relay={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, listen } => {
            let mut cfg = Config::load(config.as_deref())?;
            init_tracing(&cfg.logging.level);

            match &config {
                Some(path) => tracing::info!(config = %path, "Loaded configuration"),
                None => tracing::info!("No config file given, using defaults"),
            }

            if let Some(addr) = listen {
                tracing::info!(listen = %addr, "Override listen address");
                cfg.server.listen = addr;
            }

            chat_relay::proxy::run_server(cfg).await
        }

        Commands::Check { config } => {
            let cfg = Config::from_file(&config)?;
            println!("Configuration OK: {}", config);
            println!("  listen:   {}", cfg.server.listen);
            println!("  upstream: {}", cfg.upstream.base_url);
            println!("  models:   {}", cfg.upstream.models.join(", "));
            Ok(())
        }

        Commands::Models { config } => {
            let cfg = Config::load(config.as_deref())?;
            for (i, model) in cfg.upstream.models.iter().enumerate() {
                println!("{}. {}", i + 1, model);
            }
            Ok(())
        }
    }
}
