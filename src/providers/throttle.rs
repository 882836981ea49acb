//! Global call throttling and bounded retry shared by the HTTP providers.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::ProviderError;

/// Enforces a fixed minimum interval between calls. Global to the client
/// that owns it, not per-query.
pub struct CallThrottle {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl CallThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Block until the minimum interval since the previous call has
    /// elapsed, then record this call.
    pub fn wait(&self) {
        let mut last = self.last_call.lock().unwrap();
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

/// Bounded retry with linear backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl From<&crate::config::BenchmarkConfig> for RetryPolicy {
    fn from(config: &crate::config::BenchmarkConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            base_delay: config.retry_base_delay(),
        }
    }
}

/// Run `op` up to `policy.max_attempts` times, sleeping
/// `base_delay × attempt` between tries. Only retryable errors
/// (rate limit, transport) are retried; a 403 returns immediately.
pub fn with_retry<T>(
    policy: &RetryPolicy,
    op_name: &str,
    mut op: impl FnMut() -> Result<T, ProviderError>,
) -> Result<T, ProviderError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.base_delay * attempt;
                tracing::warn!(
                    op = op_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retryable provider error, backing off"
                );
                std::thread::sleep(delay);
            }
            Err(e) => return Err(e),
        }
    }
}
