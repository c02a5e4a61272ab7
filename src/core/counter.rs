//! Token counting with a local fallback estimate

use std::sync::Arc;
use tracing::debug;

use crate::core::client::TranslationBackend;

/// Characters per token assumed by the local estimator. English runs about
/// 4 chars/token; 3 keeps the estimate high so chunks stay under budget.
const ESTIMATE_CHARS_PER_TOKEN: usize = 3;

/// Conservative local token estimate: `max(1, chars / 3)`.
///
/// Counts Unicode scalar values, matching how the remote tokenizer's numbers
/// were calibrated against mixed English/Japanese text.
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() / ESTIMATE_CHARS_PER_TOKEN).max(1)
}

/// Token counter backed by the remote tokenizer, never failing.
///
/// A remote failure of any kind silently degrades to [`estimate_tokens`];
/// callers must not assume strict additivity under concatenation either way.
#[derive(Debug, Clone)]
pub struct TokenCounter {
    backend: Arc<dyn TranslationBackend>,
}

impl TokenCounter {
    /// Create a counter over a backend handle
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self { backend }
    }

    /// Count tokens in `text`, falling back to the local estimate
    pub async fn count(&self, text: &str) -> usize {
        match self.backend.count_tokens(text).await {
            Ok(n) => n,
            Err(e) => {
                debug!("Remote token count failed, using local estimate: {}", e);
                estimate_tokens(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::ScriptedBackend;

    #[test]
    fn test_estimate_floor_is_one() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("ab"), 1);
    }

    #[test]
    fn test_estimate_counts_chars_not_bytes() {
        // 9 Japanese chars = 27 bytes; estimate must use chars
        let text = "カグルへようこそです。";
        assert_eq!(estimate_tokens(text), text.chars().count() / 3);
    }

    #[tokio::test]
    async fn test_remote_count_used_when_available() {
        let backend = Arc::new(ScriptedBackend::counting(10));
        let counter = TokenCounter::new(backend);
        // ScriptedBackend::counting(10) reports chars/10
        assert_eq!(counter.count("0123456789012345678901234567890").await, 3);
    }

    #[tokio::test]
    async fn test_fallback_on_remote_failure() {
        let backend = Arc::new(ScriptedBackend::counting_unavailable());
        let counter = TokenCounter::new(backend);
        let text = "x".repeat(300);
        assert_eq!(counter.count(&text).await, 100);
    }
}
