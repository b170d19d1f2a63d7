//! Source of "now" for range resolution and month comparison.

use callmetrics_common::Timestamp;
use chrono::Utc;

/// Provides the current instant.
pub trait Clock: Send + Sync {
    /// Current time in UTC.
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock pinned to one instant, for reproducible reports and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl FixedClock {
    /// Creates a clock that always reports `at`.
    pub const fn new(at: Timestamp) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callmetrics_common::test_utils::mock_timestamp;

    #[test]
    fn test_fixed_clock_is_stable() {
        let at = mock_timestamp(2024, 2, 29, 12, 0, 0);
        let clock = FixedClock::new(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}
