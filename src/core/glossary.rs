//! Terminology substitution pass applied to translated output

use regex::{NoExpand, Regex};

use crate::core::errors::{Result, TranslationError};

/// Ordered whole-word glossary substitutions.
///
/// Each entry compiles to a case-sensitive, word-boundary-anchored pattern.
/// Entries apply in configured order, each as an independent global pass;
/// overlapping terms are deliberately not deconflicted.
#[derive(Debug, Clone)]
pub struct Glossary {
    /// Compiled (pattern, replacement) pairs in application order
    entries: Vec<(Regex, String)>,
}

impl Glossary {
    /// Compile a glossary from (source term, replacement) pairs
    pub fn new(pairs: &[(String, String)]) -> Result<Self> {
        let mut entries = Vec::with_capacity(pairs.len());
        for (source, target) in pairs {
            let pattern = format!(r"\b{}\b", regex::escape(source));
            let re = Regex::new(&pattern).map_err(|e| TranslationError::GlossaryError {
                message: format!("{source}: {e}"),
            })?;
            entries.push((re, target.clone()));
        }
        Ok(Self { entries })
    }

    /// Apply all substitutions to `text` in order
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (re, target) in &self.entries {
            out = re.replace_all(&out, NoExpand(target)).into_owned();
        }
        out
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the glossary has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
