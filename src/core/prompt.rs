//! Fixed translation prompt preamble and prompt assembly
//!
//! The segmenter measures chunks with the preamble attached and the pipeline
//! sends the same assembly to the API, so both must go through [`with_preamble`].

/// Instruction block prepended to every translation request.
pub const PROMPT_PREFIX: &str = "You are a professional technical translator.
Translate the following Markdown from English to Japanese.
Rules:
- Preserve ALL Markdown structure (headings, lists, tables, links).
- Do NOT translate fenced code blocks (```...```), inline code (`code`), or URLs.
- Translate only the visible link text; keep link targets unchanged.
- Keep math/LaTeX as-is.
- No extra commentary. Output ONLY translated Markdown.
";

/// Separator between the preamble and the document text.
const PREAMBLE_SEP: &str = "\n\n";

/// Attach the fixed preamble to a text, producing the exact string that is
/// token-counted and sent to the API.
pub fn with_preamble(text: &str) -> String {
    let mut prompt = String::with_capacity(PROMPT_PREFIX.len() + PREAMBLE_SEP.len() + text.len());
    prompt.push_str(PROMPT_PREFIX);
    prompt.push_str(PREAMBLE_SEP);
    prompt.push_str(text);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_preamble_layout() {
        let prompt = with_preamble("# Title");
        assert!(prompt.starts_with(PROMPT_PREFIX));
        assert!(prompt.ends_with("\n\n# Title"));
    }
}
