//! Optional retry of individual API calls.

use std::time::Duration;

use gtm_model::RemoteError;
use serde::Deserialize;
use tracing::warn;

/// Exponential backoff for retryable errors (transport, 429, 5xx).
///
/// The default performs a single attempt.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    #[serde(with = "secs")]
    pub initial_delay: Duration,
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_secs(1),
            backoff: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Runs `call` until it succeeds, fails permanently or retries run out.
    pub fn run<T>(
        &self,
        operation: &str,
        mut call: impl FnMut() -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let mut delay = self.initial_delay;
        let mut attempt = 0;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        operation,
                        attempt,
                        max_retries = self.max_retries,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "retrying"
                    );
                    std::thread::sleep(delay);
                    delay = delay.mul_f64(self.backoff.max(1.0));
                }
                Err(err) => return Err(err),
            }
        }
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
