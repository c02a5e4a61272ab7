//! Scripted backend double shared by the core and pipeline tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::core::client::TranslationBackend;
use crate::core::errors::{Result, TranslationError};
use crate::core::prompt::PROMPT_PREFIX;

/// Backend with deterministic token counts and scripted generate outcomes.
///
/// Token counting reports `chars / divisor`, or fails outright when built
/// with [`ScriptedBackend::counting_unavailable`] to exercise the local
/// estimator fallback. Generate pops a FIFO of scripted results; once the
/// script is exhausted it echoes the prompt body prefixed with `[JA]`.
#[derive(Debug)]
pub(crate) struct ScriptedBackend {
    /// Characters per token; `None` means remote counting is unavailable
    count_divisor: Option<usize>,
    /// FIFO of scripted generate outcomes
    generate_script: Mutex<VecDeque<Result<String>>>,
    /// Number of generate calls observed
    pub generate_calls: AtomicUsize,
}

impl ScriptedBackend {
    /// Backend whose tokenizer reports `chars / divisor` tokens
    pub fn counting(divisor: usize) -> Self {
        Self {
            count_divisor: Some(divisor),
            generate_script: Mutex::new(VecDeque::new()),
            generate_calls: AtomicUsize::new(0),
        }
    }

    /// Backend whose tokenizer always fails
    pub fn counting_unavailable() -> Self {
        Self {
            count_divisor: None,
            generate_script: Mutex::new(VecDeque::new()),
            generate_calls: AtomicUsize::new(0),
        }
    }

    /// Queue scripted generate outcomes, consumed in order
    pub fn with_generate_script(self, script: Vec<Result<String>>) -> Self {
        *self.generate_script.lock().unwrap() = script.into();
        self
    }

    /// A transient (retryable) remote error
    pub fn transient(message: &str) -> TranslationError {
        TranslationError::RateLimited {
            message: message.to_string(),
        }
    }

    /// A fatal remote error
    pub fn fatal(message: &str) -> TranslationError {
        TranslationError::ApiError {
            status: 400,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl TranslationBackend for ScriptedBackend {
    async fn count_tokens(&self, text: &str) -> Result<usize> {
        match self.count_divisor {
            Some(divisor) => Ok((text.chars().count() / divisor).max(1)),
            None => Err(TranslationError::NetworkError {
                message: "tokenizer offline".to_string(),
            }),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(result) = self.generate_script.lock().unwrap().pop_front() {
            return result;
        }

        let body = prompt
            .strip_prefix(PROMPT_PREFIX)
            .and_then(|rest| rest.strip_prefix("\n\n"))
            .unwrap_or(prompt);
        Ok(format!("[JA] {}", body.trim()))
    }
}
