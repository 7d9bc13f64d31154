// src/services/retry.rs
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::completion::{CompletionClient, PromptMessage};
use crate::error::UpstreamError;

const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Retries transient upstream failures with exponential backoff.
pub struct RetryingClient<C> {
    inner: C,
    max_retries: u32,
    base_delay: Duration,
}

impl<C> RetryingClient<C> {
    pub fn new(inner: C, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF)
    }
}

#[async_trait]
impl<C: CompletionClient> CompletionClient for RetryingClient<C> {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, UpstreamError> {
        let mut attempt = 0;
        loop {
            match self.inner.complete(messages).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    attempt += 1;
                    warn!(
                        error = %e,
                        attempt,
                        max_retries = self.max_retries,
                        delay = ?delay,
                        "Retrying upstream call"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
