//! Platform abstraction trait definitions.

use std::fmt::Debug;
use std::time::Instant;

/// Provides the current time to timers and sessions.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Gets the current point in time.
    ///
    /// Successive calls never go backwards.
    fn now(&self) -> Instant;
}
