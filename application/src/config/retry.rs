//! Retry policy for outbound model calls.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded exponential backoff with additive jitter.
///
/// The wait after failed attempt `n` (1-based) is
/// `min(base_delay * 2^(n-1), max_delay) + uniform(0, max_jitter)`.
/// Defaults allow 450 attempts, so a transient outage is waited out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first call
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 450,
            base_delay_ms: 1_000,
            max_delay_ms: 120_000,
            max_jitter_ms: 5_000,
        }
    }
}

impl RetryConfig {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Whether another attempt may follow failed attempt `attempt` (1-based)
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Deterministic part of the wait after failed attempt `attempt`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(62) as i32;
        let delay = self.base_delay_ms as f64 * 2f64.powi(exponent);
        let capped = delay.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }

    /// Full wait after failed attempt `attempt`, jitter included
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let jitter = if self.max_jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.max_jitter_ms)
        };
        self.backoff_delay(attempt) + Duration::from_millis(jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(3), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_capped() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff_delay(8), Duration::from_secs(120));
        assert_eq!(config.backoff_delay(449), Duration::from_secs(120));
    }

    #[test]
    fn test_jitter_bounded() {
        let config = RetryConfig::default();
        for _ in 0..50 {
            let delay = config.calculate_delay(2);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_secs(7));
        }
    }

    #[test]
    fn test_zero_jitter_is_deterministic() {
        let config = RetryConfig {
            max_jitter_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.calculate_delay(1), Duration::from_secs(1));
    }

    #[test]
    fn test_should_retry() {
        let config = RetryConfig::default().with_max_attempts(3);
        assert!(config.should_retry(1));
        assert!(config.should_retry(2));
        assert!(!config.should_retry(3));
        assert!(!RetryConfig::none().should_retry(1));
    }
}
