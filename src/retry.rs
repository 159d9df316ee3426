//! Bounded retry with exponential backoff.
//!
//! Wraps a whole run, never a single trip: a retried run starts a fresh
//! episode with fresh estimator and policy state. Backoff doubles per
//! attempt up to `max_backoff_ms`. Only transient errors are retried.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

use crate::{Error, Result};

/// One boxed attempt borrowing the state passed to [`RetryPolicy::execute`].
pub type Attempt<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryConfig {
    /// Total attempts including the first (minimum 1).
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 30_000,
            max_backoff_ms: 300_000,
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::config("max_attempts must be at least 1"));
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(Error::config("max_backoff_ms must be >= initial_backoff_ms"));
        }
        Ok(())
    }
}

/// Executes an async operation under a [`RetryConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    cfg: RetryConfig,
}

impl RetryPolicy {
    pub fn new(cfg: RetryConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Delay before retry number `attempt` (1-based): `initial * 2^(attempt-1)`, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        let ms = self
            .cfg
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.cfg.max_backoff_ms);
        Duration::from_millis(ms)
    }

    /// Delay before the next attempt, or `None` if `err` after `attempt`
    /// attempts should be returned to the caller.
    pub fn retry_delay(&self, attempt: u32, err: &Error) -> Option<Duration> {
        if !err.is_transient() || attempt >= self.cfg.max_attempts {
            error!(attempt, error = %err, "giving up");
            return None;
        }
        let delay = self.backoff(attempt);
        warn!(
            attempt,
            max_attempts = self.cfg.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "transient failure, retrying"
        );
        Some(delay)
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `state` is lent to each attempt in turn, so an attempt may hold it
    /// mutably across its awaits.
    pub async fn execute<S, T, F>(&self, state: &mut S, mut operation: F) -> Result<T>
    where
        S: ?Sized,
        F: for<'a> FnMut(&'a mut S, u32) -> Attempt<'a, T>,
    {
        let mut attempt = 1;
        loop {
            match operation(&mut *state, attempt).await {
                Ok(v) => return Ok(v),
                Err(e) => match self.retry_delay(attempt, &e) {
                    Some(delay) => {
                        sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    }
}
