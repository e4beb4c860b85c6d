use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::openai_client::{ChatModel, CompletionError};

/// Retries rate-limited completions: wait before retry `n` is `base_delay * 2^n`
/// plus up to `max_jitter` of random jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, retry: u32) -> Duration {
        let backoff = self
            .base_delay
            .saturating_mul(2_u32.saturating_pow(retry));
        backoff.saturating_add(self.jitter())
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub async fn complete_with_retry(
    model: &dyn ChatModel,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
    instruction: &str,
    text: &str,
) -> Result<String, CompletionError> {
    let mut retry = 0;

    loop {
        match model.complete(instruction, text).await {
            Ok(raw) => return Ok(raw),
            Err(e) if e.is_rate_limit() && retry < policy.max_retries => {
                retry += 1;
                let wait = policy.delay_for(retry);
                log::warn!(
                    "Model rate limited, retry {}/{} in {}ms: {}",
                    retry,
                    policy.max_retries,
                    wait.as_millis(),
                    e
                );
                sleeper.sleep(wait).await;
            }
            Err(e) => {
                if e.is_rate_limit() {
                    log::error!("Model still rate limited after {} retries", retry);
                }
                return Err(e);
            }
        }
    }
}
