//! Provider retry — bounded re-attempts for transient backend failures.
//!
//! Wraps any provider. Only transient errors (network, timeout, rate limit)
//! are retried; everything else is returned on first occurrence. With zero
//! retries configured the wrapper is a pass-through.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use synapse_core::error::ProviderError;
use synapse_core::provider::*;
use tracing::{info, warn};

/// A provider that retries its inner provider on transient failures.
pub struct RetryingProvider {
    inner: Arc<dyn synapse_core::Provider>,
    max_retries: u32,
    backoff: Duration,
}

impl RetryingProvider {
    /// Wrap `inner` with no retries.
    pub fn new(inner: Arc<dyn synapse_core::Provider>) -> Self {
        Self {
            inner,
            max_retries: 0,
            backoff: Duration::from_millis(500),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Base delay between attempts; doubles on each retry.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

#[async_trait]
impl synapse_core::Provider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut attempt = 0u32;
        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = match &e {
                        ProviderError::RateLimited { retry_after_secs } => {
                            Duration::from_secs(*retry_after_secs).max(self.backoff)
                        }
                        _ => self.backoff.saturating_mul(2u32.saturating_pow(attempt)),
                    };
                    attempt += 1;
                    warn!(
                        provider = %self.inner.name(),
                        error = %e,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retry: transient provider failure"
                    );
                    tokio::time::sleep(delay).await;
                    info!(provider = %self.inner.name(), attempt, "Retry: re-sending request");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
