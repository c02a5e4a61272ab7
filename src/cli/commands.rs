//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;

use crate::core::config::TranslatorConfig;

/// Commands for the Kaggle Markdown translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate Markdown files from English to Japanese
    Md {
        /// Input file or directory (required)
        #[arg(short, long)]
        file: PathBuf,

        /// Recursively translate subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// JSON config file (defaults to environment configuration)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Count tokens in a file with the remote tokenizer
    Tokens {
        /// File to measure
        #[arg(short, long)]
        file: PathBuf,

        /// JSON config file (defaults to environment configuration)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Load configuration from a JSON file when given, else from the environment
fn load_config(path: Option<PathBuf>) -> anyhow::Result<TranslatorConfig> {
    match path {
        Some(p) => TranslatorConfig::from_file(p),
        None => TranslatorConfig::from_env(),
    }
}

/// Handle Markdown translation command
pub async fn handle_md(
    file: PathBuf,
    recursive: bool,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    use crate::core::client::GeminiClient;
    use crate::processors::markdown::MarkdownTranslator;
    use indicatif::{ProgressBar, ProgressStyle};
    use std::sync::Arc;
    use std::time::Instant;
    use tracing::info;

    let start_time = Instant::now();

    info!("Starting Markdown translation");
    info!("Input: {}", file.display());
    info!("Recursive: {}", recursive);

    let config = load_config(config)?;
    let client = GeminiClient::new(&config)?;
    let translator = MarkdownTranslator::new(config, Arc::new(client))?;

    // Find files
    let files = if file.is_dir() {
        if recursive {
            translator.find_files_recursive(&file)?
        } else {
            translator.find_files(&file)?
        }
    } else if translator.is_translated_output(&file) {
        anyhow::bail!("{} already carries the translated suffix", file.display());
    } else {
        vec![file]
    };

    if files.is_empty() {
        anyhow::bail!("No Markdown files found");
    }

    // Create progress bar
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .unwrap()
        .progress_chars("=>-"));

    // Process files
    let mut processed = 0;
    let mut failed = 0;

    for file_path in files {
        pb.set_message(format!("Translating: {}", file_path.display()));

        match translator.translate_file(&file_path).await {
            Ok(written) => {
                processed += 1;
                pb.inc(1);
                pb.set_message(format!("Wrote: {}", written.display()));
            }
            Err(e) => {
                failed += 1;
                pb.set_message(format!("Failed: {} - {}", file_path.display(), e));
                eprintln!("Error translating {}: {}", file_path.display(), e);
            }
        }
    }

    pb.finish_with_message("Completed");

    let duration = start_time.elapsed();
    info!(
        "Completed: {} translated, {} failed in {:?}",
        processed, failed, duration
    );

    println!("\n✅ Translation completed!");
    println!("   Translated: {}", processed);
    println!("   Failed: {}", failed);
    println!("   Time: {:?}", duration);

    Ok(())
}

/// Handle token counting command
pub async fn handle_tokens(file: PathBuf, config: Option<PathBuf>) -> anyhow::Result<()> {
    use crate::core::client::GeminiClient;
    use crate::core::counter::TokenCounter;
    use std::sync::Arc;

    let config = load_config(config)?;
    config.validate()?;

    let content = tokio::fs::read_to_string(&file).await?;

    let client = GeminiClient::new(&config)?;
    let counter = TokenCounter::new(Arc::new(client));
    let tokens = counter.count(&content).await;

    println!("{}: ~{} tokens (soft limit {})", file.display(), tokens, config.soft_limit());

    Ok(())
}
