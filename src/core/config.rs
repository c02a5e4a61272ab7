//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Default Gemini REST endpoint (v1beta)
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model. Use "gemini-1.5-pro" when quality matters more than cost.
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Configuration for the translation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Gemini API key
    pub api_key: String,
    /// Base URL of the Gemini REST API
    pub api_endpoint: String,
    /// Model name used for both token counting and generation
    pub model: String,
    /// Maximum tokens (input + output) allowed per request
    pub max_tokens_per_request: usize,
    /// Tokens reserved for the response (Japanese output tends to grow)
    pub output_buffer_tokens: usize,
    /// Tokens reserved for the fixed prompt preamble
    pub prompt_buffer_tokens: usize,
    /// Minimum pause between chunk requests, in seconds
    pub chunk_delay_min_secs: f64,
    /// Maximum pause between chunk requests, in seconds
    pub chunk_delay_max_secs: f64,
    /// Total attempts per chunk before a transient error becomes fatal
    pub max_attempts: u32,
    /// Backoff floor in seconds
    pub backoff_floor_secs: u64,
    /// Backoff ceiling in seconds
    pub backoff_ceiling_secs: u64,
    /// HTTP request timeout in milliseconds
    pub timeout_ms: u64,
    /// Suffix appended to translated files (replaces ".md")
    pub output_suffix: String,
    /// Ordered glossary of (source term, replacement) pairs
    pub glossary: Vec<(String, String)>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("GOOGLE_API_KEY").unwrap_or_default(),
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens_per_request: 40_000,
            output_buffer_tokens: 2_000,
            prompt_buffer_tokens: 500,
            chunk_delay_min_secs: 0.9,
            chunk_delay_max_secs: 1.6,
            max_attempts: 5,
            backoff_floor_secs: 2,
            backoff_ceiling_secs: 20,
            timeout_ms: 60_000,
            output_suffix: ".ja.md".to_string(),
            glossary: Vec::new(),
        }
    }
}

/// Read an env var and parse it, falling back to a default on absence
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("invalid value for {}: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .map_err(|_| anyhow::anyhow!("GOOGLE_API_KEY environment variable is required"))?;

        let defaults = Self::default();

        Ok(Self {
            api_key,
            api_endpoint: env_or("KMT_API_ENDPOINT", defaults.api_endpoint)?,
            model: env_or("KMT_MODEL", defaults.model)?,
            max_tokens_per_request: env_or(
                "KMT_MAX_TOKENS_PER_REQUEST",
                defaults.max_tokens_per_request,
            )?,
            output_buffer_tokens: env_or("KMT_OUTPUT_BUFFER_TOKENS", defaults.output_buffer_tokens)?,
            prompt_buffer_tokens: env_or("KMT_PROMPT_BUFFER_TOKENS", defaults.prompt_buffer_tokens)?,
            chunk_delay_min_secs: env_or("KMT_CHUNK_DELAY_MIN_SECS", defaults.chunk_delay_min_secs)?,
            chunk_delay_max_secs: env_or("KMT_CHUNK_DELAY_MAX_SECS", defaults.chunk_delay_max_secs)?,
            max_attempts: env_or("KMT_MAX_ATTEMPTS", defaults.max_attempts)?,
            backoff_floor_secs: env_or("KMT_BACKOFF_FLOOR_SECS", defaults.backoff_floor_secs)?,
            backoff_ceiling_secs: env_or("KMT_BACKOFF_CEILING_SECS", defaults.backoff_ceiling_secs)?,
            timeout_ms: env_or("KMT_REQUEST_TIMEOUT_MS", defaults.timeout_ms)?,
            output_suffix: env_or("KMT_OUTPUT_SUFFIX", defaults.output_suffix)?,
            glossary: defaults.glossary,
        })
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("API key is required"));
        }

        if self.api_endpoint.is_empty() {
            return Err(anyhow::anyhow!("API endpoint is required"));
        }

        if self.model.is_empty() {
            return Err(anyhow::anyhow!("model name is required"));
        }

        if self.max_tokens_per_request <= self.output_buffer_tokens + self.prompt_buffer_tokens {
            return Err(anyhow::anyhow!(
                "max_tokens_per_request must exceed output_buffer_tokens + prompt_buffer_tokens"
            ));
        }

        if self.max_attempts == 0 {
            return Err(anyhow::anyhow!("max_attempts must be greater than 0"));
        }

        if self.chunk_delay_min_secs < 0.0 || self.chunk_delay_max_secs < self.chunk_delay_min_secs
        {
            return Err(anyhow::anyhow!("invalid chunk delay range"));
        }

        if self.backoff_ceiling_secs < self.backoff_floor_secs {
            return Err(anyhow::anyhow!(
                "backoff_ceiling_secs must be >= backoff_floor_secs"
            ));
        }

        if self.glossary.is_empty() {
            warn!("No glossary entries configured");
        }

        Ok(())
    }

    /// Token budget available to one chunk's text after reserving buffers
    /// for the prompt preamble and the expected output growth.
    pub fn soft_limit(&self) -> usize {
        self.max_tokens_per_request - self.output_buffer_tokens - self.prompt_buffer_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> TranslatorConfig {
        TranslatorConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_key() {
        let config = TranslatorConfig {
            api_key: "".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_budget_ordering() {
        let config = TranslatorConfig {
            max_tokens_per_request: 2_000,
            output_buffer_tokens: 1_800,
            prompt_buffer_tokens: 500,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_soft_limit() {
        let config = valid_config();
        assert_eq!(config.soft_limit(), 40_000 - 2_000 - 500);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = valid_config();
        config.glossary = vec![("Kaggle".to_string(), "カグル".to_string())];
        config.to_file(&path).unwrap();

        let loaded = TranslatorConfig::from_file(&path).unwrap();
        assert_eq!(loaded.model, config.model);
        assert_eq!(loaded.glossary, config.glossary);
    }
}
