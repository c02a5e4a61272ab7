//! Token-aware Markdown splitter: fence-safe, heading-preferred
//!
//! Splits a document into chunks that each fit the per-request token budget.
//! Chunks are whole-line slices; concatenating them in order reproduces the
//! input byte-for-byte. Fenced code blocks are never split, even when that
//! pushes a chunk over budget.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::core::counter::TokenCounter;
use crate::core::prompt::with_preamble;

/// Fence delimiter prefix (after trimming)
const FENCE_MARKER: &str = "```";

/// A non-empty buffer past this fraction of the soft limit is closed before
/// an incoming heading line, biasing split points to heading boundaries.
const HEADING_SPLIT_RATIO: f64 = 0.6;

/// ATX heading: one to six `#` followed by whitespace
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").expect("heading pattern"));

/// Token-budget-aware document splitter
#[derive(Debug, Clone)]
pub struct Segmenter {
    /// Token counter used for all measurements (preamble included)
    counter: TokenCounter,
    /// Token budget for (preamble + chunk text)
    soft_limit: usize,
}

impl Segmenter {
    /// Create a segmenter for one soft limit
    pub fn new(counter: TokenCounter, soft_limit: usize) -> Self {
        Self {
            counter,
            soft_limit,
        }
    }

    /// Tokens of `text` measured with the prompt preamble attached, the same
    /// assembly the translate request sends.
    async fn measured(&self, text: &str) -> usize {
        self.counter.count(&with_preamble(text)).await
    }

    /// Split `document` into translatable chunks.
    ///
    /// Whole-document fast path first; otherwise a line scan that closes the
    /// accumulation buffer when the next line would exceed the budget,
    /// preferring heading boundaries once the buffer is past
    /// [`HEADING_SPLIT_RATIO`] of the limit. A single line that alone exceeds
    /// the budget becomes its own oversized chunk rather than an error, and
    /// the heading preference is best-effort only: a skipped heading split
    /// can still leave a chunk near the limit.
    pub async fn segment(&self, document: &str) -> Vec<String> {
        if self.measured(document).await <= self.soft_limit {
            return vec![document.to_string()];
        }

        let mut chunks: Vec<String> = Vec::new();
        let mut buf = String::new();
        let mut fence_open = false;

        for line in document.split_inclusive('\n') {
            // Snapshot the fence state as it was before this line: the
            // closing delimiter still counts as inside its fence, so no
            // boundary can land between a fence and its closer.
            let was_in_fence = fence_open;
            if line.trim().starts_with(FENCE_MARKER) {
                fence_open = !fence_open;
            }

            let mut trial = String::with_capacity(buf.len() + line.len());
            trial.push_str(&buf);
            trial.push_str(line);

            if self.measured(&trial).await > self.soft_limit && !was_in_fence {
                if !buf.is_empty() {
                    chunks.push(std::mem::take(&mut buf));
                }
                buf.push_str(line);
                // One line alone over budget: emit it as an oversized chunk
                if self.measured(&buf).await > self.soft_limit {
                    chunks.push(std::mem::take(&mut buf));
                }
                continue;
            }

            let is_heading = !was_in_fence && HEADING_RE.is_match(line);
            if is_heading && !buf.is_empty() {
                let buf_tokens = self.measured(&buf).await;
                if buf_tokens as f64 > self.soft_limit as f64 * HEADING_SPLIT_RATIO {
                    chunks.push(std::mem::take(&mut buf));
                }
            }

            buf.push_str(line);
        }

        if !buf.is_empty() {
            chunks.push(buf);
        }

        debug!("Segmented document into {} chunk(s)", chunks.len());
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::ScriptedBackend;
    use std::sync::Arc;

    /// Counter whose backend reports one token per character, so budgets in
    /// these tests are character budgets over (preamble + text).
    fn char_counter() -> TokenCounter {
        TokenCounter::new(Arc::new(ScriptedBackend::counting(1)))
    }

    /// Characters the preamble assembly adds to every measurement
    fn preamble_chars() -> usize {
        with_preamble("").chars().count()
    }

    #[tokio::test]
    async fn test_fast_path_returns_single_chunk() {
        let segmenter = Segmenter::new(char_counter(), 10_000);
        let doc = "# Title\n\nShort paragraph.";

        let chunks = segmenter.segment(doc).await;
        assert_eq!(chunks, vec![doc.to_string()]);
    }

    #[tokio::test]
    async fn test_fence_is_never_split_and_concat_round_trips() {
        let soft_limit = preamble_chars() + 40;
        let segmenter = Segmenter::new(char_counter(), soft_limit);

        let doc = "one\n\
                   two\n\
                   ```\n\
                   code line that is fairly long here\n\
                   ```\n\
                   tail\n";

        let chunks = segmenter.segment(doc).await;
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), doc);

        // The whole fenced block, delimiters included, sits in one chunk
        let fenced = chunks
            .iter()
            .find(|c| c.contains("code line"))
            .expect("fenced content present");
        assert_eq!(fenced.matches("```").count(), 2);
    }

    #[tokio::test]
    async fn test_oversized_line_becomes_its_own_chunk() {
        let soft_limit = preamble_chars() + 100;
        let segmenter = Segmenter::new(char_counter(), soft_limit);

        let long_line = format!("{}\n", "x".repeat(500));
        let doc = format!("a\n{}b\n", long_line);

        let chunks = segmenter.segment(&doc).await;
        assert_eq!(chunks, vec!["a\n".to_string(), long_line, "b\n".to_string()]);
        assert_eq!(chunks.concat(), doc);
    }

    #[tokio::test]
    async fn test_segmentation_is_idempotent() {
        let soft_limit = preamble_chars() + 60;
        let segmenter = Segmenter::new(char_counter(), soft_limit);

        let doc = "# One\n\nfirst section body text\n\n# Two\n\nsecond section body text\n";
        let first = segmenter.segment(doc).await;
        let second = segmenter.segment(doc).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_split_prefers_heading_boundary() {
        let soft_limit = preamble_chars() + 200;
        let segmenter = Segmenter::new(char_counter(), soft_limit);

        let section_one: String = (0..15).map(|i| format!("line {i} of part A\n")).collect();
        let section_two: String = (0..15).map(|i| format!("line {i} of part B\n")).collect();
        let doc = format!("{}## Next\n{}", section_one, section_two);

        let chunks = segmenter.segment(&doc).await;
        assert!(chunks.len() >= 2);
        assert_eq!(chunks.concat(), doc);
        // The heading starts a chunk rather than trailing the previous one
        assert!(chunks.iter().any(|c| c.starts_with("## Next\n")));
    }

    #[tokio::test]
    async fn test_giant_fenced_block_is_one_oversized_chunk() {
        // A fenced block far over budget must come back whole
        let segmenter = Segmenter::new(char_counter(), 1_000);

        let doc = format!("```\n{}\n```\n", "x".repeat(3_000));
        let chunks = segmenter.segment(&doc).await;
        assert_eq!(chunks, vec![doc.clone()]);
    }

    #[tokio::test]
    async fn test_estimator_fallback_still_segments() {
        // Remote tokenizer offline: the local estimate drives the scan
        let counter = TokenCounter::new(Arc::new(ScriptedBackend::counting_unavailable()));
        let soft_limit = (preamble_chars() / 3) + 30;
        let segmenter = Segmenter::new(counter, soft_limit);

        let doc: String = (0..40).map(|i| format!("paragraph line {i}\n")).collect();
        let chunks = segmenter.segment(&doc).await;
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), doc);
    }
}
