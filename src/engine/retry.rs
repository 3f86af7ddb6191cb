// LeadScout Engine — Retry Policy
// Wraps a fallible upstream call with bounded linear backoff for transient
// failures only. Linear (base × attempt), not exponential — it matches the
// observed upstream rate-limit recovery pattern. The backoff sleeps via
// tokio, suspending only the current task.

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::engine::config::CoreConfig;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum retries after the first attempt (default 2).
    pub max_retries: u32,
    /// Backoff base; attempt N sleeps base × N before retrying.
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base: Duration) -> Self {
        RetryPolicy { max_retries, backoff_base }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        RetryPolicy {
            max_retries: config.max_retries,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }

    /// Invoke `op`, retrying while `is_transient` approves and attempts
    /// remain. Non-transient errors and the last exhausted-retry error
    /// propagate unchanged.
    pub async fn run<T, E, Fut, Op, Cls>(&self, mut op: Op, is_transient: Cls) -> Result<T, E>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Cls: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && is_transient(&err) => {
                    attempt += 1;
                    let delay = self.backoff_base * attempt;
                    warn!(
                        "[retry] transient failure (attempt {}/{}): {} — backing off {}ms",
                        attempt,
                        self.max_retries,
                        err,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
