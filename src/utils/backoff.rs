use std::time::Duration;

/// Bounded exponential backoff for a single page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay before the attempt following failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);

        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

#[test]
fn test_delay_doubles() {
    let policy = RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(60),
    };

    assert_eq!(policy.delay_for(1), Duration::from_secs(1));
    assert_eq!(policy.delay_for(2), Duration::from_secs(2));
    assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    assert_eq!(policy.delay_for(4), Duration::from_secs(8));
}

#[test]
fn test_delay_capped() {
    let policy = RetryPolicy {
        max_attempts: 100,
        base_delay: Duration::from_millis(500),
        max_delay: Duration::from_secs(10),
    };

    assert_eq!(policy.delay_for(6), Duration::from_secs(10));
    assert_eq!(policy.delay_for(40), Duration::from_secs(10));
}

#[test]
fn test_allows_retry_after() {
    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    };

    assert!(policy.allows_retry_after(1));
    assert!(policy.allows_retry_after(2));
    assert!(!policy.allows_retry_after(3));
}
