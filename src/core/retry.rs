//! Bounded exponential-backoff retry for transient remote failures

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::Result;

/// Retry policy: a fixed attempt budget with clamped exponential backoff.
///
/// Only errors classified transient ([`crate::core::errors::TranslationError::is_transient`])
/// are retried; fatal errors propagate on first occurrence. Exhausting the
/// budget re-raises the last transient error.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    max_attempts: u32,
    /// Base unit of the exponential schedule
    multiplier: Duration,
    /// Lower clamp on the computed backoff
    floor: Duration,
    /// Upper clamp on the computed backoff
    ceiling: Duration,
}

impl RetryPolicy {
    /// Build a policy with explicit knobs
    pub fn new(max_attempts: u32, multiplier: Duration, floor: Duration, ceiling: Duration) -> Self {
        Self {
            max_attempts,
            multiplier,
            floor,
            ceiling,
        }
    }

    /// Build the production policy from configuration: multiplier 1s, the
    /// configured attempt budget and floor/ceiling seconds.
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(1),
            Duration::from_secs(config.backoff_floor_secs),
            Duration::from_secs(config.backoff_ceiling_secs),
        )
    }

    /// Delay to wait after `completed_attempts` failed attempts:
    /// `clamp(multiplier * 2^completed_attempts, floor, ceiling)`.
    pub fn backoff(&self, completed_attempts: u32) -> Duration {
        let exponent = completed_attempts.min(16);
        let raw = self.multiplier.saturating_mul(1u32 << exponent);
        raw.clamp(self.floor, self.ceiling)
    }

    /// Run `op`, retrying transient failures until the attempt budget runs out
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("Succeeded after {} attempt(s)", attempt);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "Transient error on attempt {}/{}, retrying in {:?}: {}",
                        attempt, self.max_attempts, delay, e
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
