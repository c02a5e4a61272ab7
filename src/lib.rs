//! Kaggle Markdown Translator - token-budget-aware EN -> JA translation
//!
//! This library translates Markdown documents under a strict per-request
//! token ceiling: documents are split at safe structural boundaries (never
//! inside fenced code blocks, preferably at headings), each chunk is
//! translated through a retrying remote client, and the results are
//! reassembled in source order with a glossary pass applied.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub mod cli;
pub mod core;
pub mod processors;

// Re-export key types for convenience
pub use crate::core::{
    client::{GeminiClient, TranslationBackend},
    config::TranslatorConfig,
    counter::{estimate_tokens, TokenCounter},
    errors::TranslationError,
    glossary::Glossary,
    retry::RetryPolicy,
    segmenter::Segmenter,
};

pub use crate::processors::markdown::MarkdownTranslator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
