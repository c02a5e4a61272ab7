//! Remote translation backend trait and the Gemini HTTP client

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{classify_api_error, Result, TranslationError};

/// Capability the pipeline needs from a remote generative-text service.
///
/// The real implementation is [`GeminiClient`]; tests substitute a scripted
/// backend so segmentation and retry behavior are deterministic.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Count tokens in `text` with the model's own tokenizer.
    async fn count_tokens(&self, text: &str) -> Result<usize>;

    /// Generate text from a fully assembled prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Gemini REST client (v1beta `countTokens` / `generateContent`)
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    api_endpoint: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Request URL for one model method (countTokens, generateContent)
    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.api_endpoint, self.model, method, self.api_key
        )
    }

    /// Both Gemini methods take the same contents/parts body shape
    fn request_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "parts": [{ "text": text }]
            }]
        })
    }

    /// POST a body and return the parsed JSON, classifying non-success
    /// statuses into transient or fatal errors.
    async fn post(&self, method: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(self.method_url(method))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();

        if status.is_success() {
            let json: serde_json::Value =
                response
                    .json()
                    .await
                    .map_err(|e| TranslationError::InvalidResponseError {
                        message: e.to_string(),
                    })?;
            Ok(json)
        } else {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();
            debug!("Gemini {} failed: {} - {}", method, status_code, error_text);
            Err(classify_api_error(status_code, error_text))
        }
    }
}

#[async_trait]
impl TranslationBackend for GeminiClient {
    async fn count_tokens(&self, text: &str) -> Result<usize> {
        let json = self.post("countTokens", &Self::request_body(text)).await?;

        json["totalTokens"]
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| TranslationError::InvalidResponseError {
                message: "countTokens response missing totalTokens".to_string(),
            })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let json = self
            .post("generateContent", &Self::request_body(prompt))
            .await?;

        let parts = json["candidates"]
            .get(0)
            .and_then(|c| c["content"]["parts"].as_array())
            .ok_or_else(|| TranslationError::InvalidResponseError {
                message: "generateContent response has no candidates".to_string(),
            })?;

        let text: String = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect();

        if text.is_empty() {
            return Err(TranslationError::InvalidResponseError {
                message: "generateContent response has no text parts".to_string(),
            });
        }

        Ok(text)
    }
}
