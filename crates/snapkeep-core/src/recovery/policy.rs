//! Retry configuration: attempt budget and per-attempt backoff delays.

use std::time::Duration;

/// Delay used when the configured delay table is empty.
const FALLBACK_DELAY: Duration = Duration::from_secs(2);

/// Bounded-retry policy captured once per `execute_with_retry` call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first). Config loading
    /// clamps this to >= 1; the executor tolerates 0 without panicking.
    pub max_attempts: u32,
    /// Backoff delay per attempt, looked up by 1-based attempt number.
    pub delays: Vec<Duration>,
    /// When false, the first failure ends the loop (no retries).
    pub enabled: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delays: vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
            ],
            enabled: true,
        }
    }
}

impl RetryConfig {
    /// Backoff delay before the attempt following `attempt` (1-based).
    ///
    /// Out-of-range attempt numbers, including 0, clamp to the last entry of
    /// the delay table.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let n = attempt as usize;
        if n >= 1 && n <= self.delays.len() {
            self.delays[n - 1]
        } else {
            self.delays.last().copied().unwrap_or(FALLBACK_DELAY)
        }
    }
}
