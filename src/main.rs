//! Main entry point for the Kaggle Markdown translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod core;
mod processors;

use cli::commands::Commands;

/// Kaggle Markdown Translator - token-budget-aware EN -> JA translation
#[derive(Parser, Debug)]
#[command(name = "kaggle-md-translator", version, about, long_about = None)]
struct Args {
    /// API key for Gemini (optional, defaults to GOOGLE_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Gemini model name (optional, defaults to gemini-1.5-flash)
    #[arg(long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    let log_level = if std::env::var("RUST_LOG").is_ok() {
        std::env::var("RUST_LOG").unwrap()
    } else {
        "info".to_string()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", env!("CARGO_PKG_NAME"), log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Override config with CLI args if provided
    if let Some(api_key) = args.api_key {
        std::env::set_var("GOOGLE_API_KEY", api_key);
    }

    if let Some(model) = args.model {
        std::env::set_var("KMT_MODEL", model);
    }

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    // Execute command
    match args.command {
        Some(Commands::Md {
            file,
            recursive,
            config,
        }) => {
            cli::commands::handle_md(file, recursive, config).await?;
        }
        Some(Commands::Tokens { file, config }) => {
            cli::commands::handle_tokens(file, config).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
