//! Fake platform implementation for testing.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::pal::abstractions::Platform;

/// Fake implementation of the platform abstraction for testing.
///
/// Time stands still until a test calls [`advance()`](Self::advance). Clones share the same
/// clock, so a test can keep a clone and move time forward while a timer is measuring.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    now: Arc<Mutex<Instant>>,
}

impl FakePlatform {
    /// Creates a new fake platform whose clock starts at the current real time.
    pub(crate) fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Moves the clock of this platform and all its clones forward.
    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self
            .now
            .lock()
            .expect("FakePlatform state lock should not be poisoned");

        *now = now
            .checked_add(by)
            .expect("advancing the fake clock overflows Instant - this indicates an unrealistic scenario");
    }
}

impl Platform for FakePlatform {
    fn now(&self) -> Instant {
        *self
            .now
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn time_stands_still_without_advance() {
        let platform = FakePlatform::new();
        assert_eq!(platform.now(), platform.now());
    }

    #[test]
    fn advance_moves_time_forward() {
        let platform = FakePlatform::new();
        let start = platform.now();

        platform.advance(Duration::from_millis(150));

        assert_eq!(
            platform.now().duration_since(start),
            Duration::from_millis(150)
        );
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();
        let start = platform2.now();

        platform1.advance(Duration::from_secs(2));

        assert_eq!(platform2.now().duration_since(start), Duration::from_secs(2));
    }
}
