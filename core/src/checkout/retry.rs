// fitbook/src/checkout/retry.rs

use crate::config::ClientConfig;
use std::time::Duration;

/// Bounded retry with exponential backoff: attempt `n` (1-based) is followed
/// by a pause of `backoff * 2^(n-1)` unless it was the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  pub attempts: u32,
  pub backoff: Duration,
}

impl RetryPolicy {
  pub fn new(attempts: u32, backoff: Duration) -> Self {
    Self {
      attempts: attempts.max(1),
      backoff,
    }
  }

  pub fn from_config(config: &ClientConfig) -> Self {
    Self::new(config.confirm_attempts, config.confirm_backoff)
  }

  /// Pause after failed attempt `attempt`, or `None` if no attempt follows.
  pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
    if attempt == 0 || attempt >= self.attempts {
      return None;
    }
    let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
    Some(self.backoff.saturating_mul(factor))
  }
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self::new(3, Duration::from_millis(500))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn backoff_doubles_and_stops_at_the_last_attempt() {
    let policy = RetryPolicy::new(4, Duration::from_millis(100));
    assert_eq!(policy.delay_after(1), Some(Duration::from_millis(100)));
    assert_eq!(policy.delay_after(2), Some(Duration::from_millis(200)));
    assert_eq!(policy.delay_after(3), Some(Duration::from_millis(400)));
    assert_eq!(policy.delay_after(4), None);
  }

  #[test]
  fn at_least_one_attempt() {
    assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts, 1);
  }
}
