//! Markdown translation pipeline: segment, translate with retry, reassemble

use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::core::client::{GeminiClient, TranslationBackend};
use crate::core::config::TranslatorConfig;
use crate::core::counter::TokenCounter;
use crate::core::errors::{Result, TranslationError};
use crate::core::glossary::Glossary;
use crate::core::prompt::with_preamble;
use crate::core::retry::RetryPolicy;
use crate::core::segmenter::Segmenter;

/// Separator between translated chunks on reassembly
const JOIN_SEP: &str = "\n\n";

/// Per-document translation pipeline over an injected backend.
///
/// Chunks are translated strictly sequentially and reassembled in source
/// order; an etiquette pause separates chunk requests. Any fatal error
/// aborts the document with no output written.
#[derive(Debug, Clone)]
pub struct MarkdownTranslator {
    /// Remote generative-text service handle
    backend: Arc<dyn TranslationBackend>,
    /// Pipeline configuration (budgets, delays, suffixes)
    config: TranslatorConfig,
    /// Token counter over the backend, with local fallback
    counter: TokenCounter,
    /// Retry policy for transient remote failures
    retry: RetryPolicy,
    /// Terminology substitution pass applied to translated output
    glossary: Glossary,
}

impl MarkdownTranslator {
    /// Create a pipeline over a backend
    pub fn new(config: TranslatorConfig, backend: Arc<dyn TranslationBackend>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| TranslationError::ConfigError {
                message: e.to_string(),
            })?;

        let counter = TokenCounter::new(backend.clone());
        let retry = RetryPolicy::from_config(&config);
        let glossary = Glossary::new(&config.glossary)?;

        Ok(Self {
            backend,
            config,
            counter,
            retry,
            glossary,
        })
    }

    /// Create from environment configuration with the real Gemini client
    pub fn from_env() -> Result<Self> {
        let config = TranslatorConfig::from_env().map_err(|e| TranslationError::ConfigError {
            message: e.to_string(),
        })?;
        let client = GeminiClient::new(&config)?;
        Self::new(config, Arc::new(client))
    }

    /// Find Markdown files in a directory (non-recursive), skipping files
    /// that already carry the translated suffix
    pub fn find_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TranslationError::FileError {
                path: dir.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && self.is_translatable(&path) {
                files.push(path);
            }
        }
        files.sort();

        Ok(files)
    }

    /// Find Markdown files recursively
    pub fn find_files_recursive(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TranslationError::FileError {
                path: dir.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && self.is_translatable(path) {
                files.push(path.to_path_buf());
            }
        }
        files.sort();

        Ok(files)
    }

    /// Markdown source that is not itself a translation output
    fn is_translatable(&self, path: &Path) -> bool {
        let is_markdown = path
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                ext == "md" || ext == "markdown"
            })
            .unwrap_or(false);

        is_markdown && !self.is_translated_output(path)
    }

    /// Whether the file name already carries the translated suffix
    pub fn is_translated_output(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| {
                n.to_string_lossy()
                    .ends_with(&self.config.output_suffix)
            })
            .unwrap_or(false)
    }

    /// Output path for a source file: `<stem><suffix>` next to the source
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        input.with_file_name(format!("{}{}", stem, self.config.output_suffix))
    }

    /// Translate one document, returning the reassembled Japanese Markdown
    pub async fn translate_text(&self, document: &str) -> Result<String> {
        let soft_limit = self.config.soft_limit();
        let segmenter = Segmenter::new(self.counter.clone(), soft_limit);

        let chunks = segmenter.segment(document).await;
        info!("Split into {} chunk(s)", chunks.len());

        let mut parts = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let approx = self.counter.count(chunk).await;
            info!(
                "Translating chunk {}/{} (~{} tokens input)",
                i + 1,
                chunks.len(),
                approx
            );

            let prompt = with_preamble(chunk);
            let translated = self.retry.run(|| self.backend.generate(&prompt)).await?;
            parts.push(translated.trim().to_string());

            self.pause_between_chunks().await;
        }

        let joined = parts.join(JOIN_SEP);
        Ok(self.glossary.apply(&joined))
    }

    /// Translate a single Markdown file, writing `<stem>.ja.md` next to it.
    ///
    /// Output is written only on full success; a failed document leaves no
    /// partial file behind. Returns the path written.
    pub async fn translate_file(&self, input: &Path) -> Result<PathBuf> {
        debug!("Translating: {}", input.display());

        let content = tokio::fs::read_to_string(input)
            .await
            .map_err(|e| TranslationError::FileError {
                path: input.display().to_string(),
                message: e.to_string(),
            })?;

        let translated = self.translate_text(&content).await?;

        let output = self.output_path(input);
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| TranslationError::FileError {
                        path: parent.display().to_string(),
                        message: e.to_string(),
                    })?;
            }
        }

        tokio::fs::write(&output, translated)
            .await
            .map_err(|e| TranslationError::FileError {
                path: output.display().to_string(),
                message: e.to_string(),
            })?;

        info!("Translated: {} -> {}", input.display(), output.display());
        Ok(output)
    }

    /// Count tokens in a text (remote tokenizer, local estimate on failure)
    pub async fn count_tokens(&self, text: &str) -> usize {
        self.counter.count(text).await
    }

    /// Rate-limiting etiquette toward the remote API: a uniform random pause
    /// between chunk requests, distinct from retry backoff.
    async fn pause_between_chunks(&self) {
        let (lo, hi) = (
            self.config.chunk_delay_min_secs,
            self.config.chunk_delay_max_secs,
        );
        if hi <= 0.0 {
            return;
        }
        let secs = if hi > lo {
            rand::thread_rng().gen_range(lo..=hi)
        } else {
            lo
        };
        sleep(Duration::from_secs_f64(secs)).await;
    }
}
