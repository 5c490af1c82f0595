//! A single measurement of a timer category.

use std::time::{Duration, Instant};

use crate::Timer;
use crate::pal::Platform;

/// One in-progress measurement of a category on a [`Timer`].
///
/// The start time is captured when the session is created by [`Timer::start()`]. Calling
/// [`end()`](Self::end) adds the elapsed time to the category and hands the timer back for
/// chaining. A session that is dropped without being ended adds nothing to the timer.
///
/// # Examples
///
/// ```
/// use tally_time::Timer;
///
/// let mut timer = Timer::new();
///
/// let session = timer.start("download");
/// // Perform the work being measured.
/// let timer = session.end();
///
/// assert!(timer.get_time("download").is_ok());
/// ```
#[derive(Debug)]
#[must_use = "the elapsed time is only added to the timer when the session is ended"]
pub struct TimingSession<'t> {
    timer: &'t mut Timer,
    category: String,
    started: Instant,
}

impl<'t> TimingSession<'t> {
    /// Starts measuring `category`, which the timer has already created.
    pub(crate) fn begin(category: String, timer: &'t mut Timer) -> Self {
        let started = timer.platform().now();

        Self {
            timer,
            category,
            started,
        }
    }

    /// The category this session adds its elapsed time to.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The time elapsed since the session started, without ending it.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.timer
            .platform()
            .now()
            .saturating_duration_since(self.started)
    }

    /// Ends the session, adding the elapsed time to its category.
    ///
    /// Returns the timer the session belongs to, so further sessions can be chained.
    pub fn end(self) -> &'t mut Timer {
        self.finish().0
    }

    /// Ends the session, returning the timer together with the elapsed time that was added.
    pub(crate) fn finish(self) -> (&'t mut Timer, Duration) {
        let elapsed = self.elapsed();

        let Self {
            timer, category, ..
        } = self;

        timer.accumulate(&category, elapsed);

        tracing::trace!(
            category = %category,
            elapsed_secs = elapsed.as_secs_f64(),
            "timing session ended"
        );

        (timer, elapsed)
    }
}
