use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

use crate::output::DEFAULT_PRECISION;
use crate::pal::PlatformFacade;
use crate::report_builder::report_lines;
use crate::{Error, ReportBuilder, Result, TimingSession, WatchAndReport};

thread_local! {
    static SHARED_INSTANCE: RefCell<Timer> = RefCell::new(Timer::new());
}

/// Accumulates wall-clock time per named category.
///
/// Each category holds the sum of the durations of every [`TimingSession`] completed against it
/// on this timer. Categories are kept in the order they were first started, which is also the
/// order in which they are reported.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use tally_time::Timer;
///
/// let mut timer = Timer::new();
///
/// timer.watch("load", || std::thread::sleep(Duration::from_millis(5)));
/// timer.watch("load", || std::thread::sleep(Duration::from_millis(5)));
///
/// // Both measurements were added to the same category.
/// assert!(timer.get_time("load").unwrap() >= Duration::from_millis(10));
/// ```
#[derive(Clone, Debug)]
pub struct Timer {
    categories: Vec<(String, Duration)>,
    platform: PlatformFacade,
}

impl Timer {
    /// Creates a timer without any categories.
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(PlatformFacade::real())
    }

    #[must_use]
    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self {
            categories: Vec::new(),
            platform,
        }
    }

    pub(crate) fn platform(&self) -> &PlatformFacade {
        &self.platform
    }

    /// Runs `f` with the timer shared by all code on the current thread.
    ///
    /// The shared timer is created on first use and lives until the thread exits or
    /// [`reset_instance()`](Self::reset_instance) replaces it. Every thread has its own
    /// instance, so measurements taken on different threads never race with each other.
    ///
    /// The instance is not process-wide. A helper thread calling this function gets its own
    /// empty timer, and whatever it records there does not appear in the instance of the
    /// thread that spawned it. To collect the time of several threads in one place, let each
    /// thread return its timer (or take a clone of its instance) and combine them with
    /// [`merge()`](Self::merge).
    ///
    /// # Panics
    ///
    /// Panics if called from within `f`, as the shared timer is already borrowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_time::Timer;
    ///
    /// Timer::with_instance(|timer| timer.watch("startup", || std::hint::black_box(1)));
    ///
    /// let recorded = Timer::with_instance(|timer| timer.get_time("startup").is_ok());
    /// assert!(recorded);
    /// ```
    pub fn with_instance<F, R>(f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        SHARED_INSTANCE.with_borrow_mut(f)
    }

    /// Replaces the shared timer of the current thread with an empty one.
    ///
    /// # Panics
    ///
    /// Panics if called from within [`with_instance()`](Self::with_instance).
    pub fn reset_instance() {
        SHARED_INSTANCE.set(Self::new());
    }

    /// Starts measuring a category.
    ///
    /// The category is created with a total of zero if it does not exist yet. Existing totals
    /// are never reset. The elapsed time is only added once the returned session is ended.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_time::{DEFAULT_CATEGORY, Timer};
    ///
    /// let mut timer = Timer::new();
    ///
    /// timer.start(DEFAULT_CATEGORY).end().start("cleanup").end();
    ///
    /// assert_eq!(timer.len(), 2);
    /// ```
    pub fn start(&mut self, category: impl Into<String>) -> TimingSession<'_> {
        let category = category.into();
        self.entry(&category);
        TimingSession::begin(category, self)
    }

    /// Measures `work`, adding its duration to `category`.
    ///
    /// The duration is recorded on every exit path, including when `work` panics. Whatever
    /// `work` returns is passed through unchanged, so a `Result` returned by `work` reaches the
    /// caller after its duration has been recorded.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_time::Timer;
    ///
    /// let mut timer = Timer::new();
    ///
    /// let parsed = timer.watch("parse", || "42".parse::<u32>());
    ///
    /// assert_eq!(parsed, Ok(42));
    /// assert!(timer.get_time("parse").is_ok());
    /// ```
    pub fn watch<F, R>(&mut self, category: impl Into<String>, work: F) -> R
    where
        F: FnOnce() -> R,
    {
        let session = self.start(category);
        let _end_on_exit = scopeguard::guard(session, |session| {
            session.end();
        });

        work()
    }

    /// Prepares to measure a block of work and report its duration as soon as it completes.
    ///
    /// The duration is also added to the category named `message` on this timer. See
    /// [`WatchAndReport`] for the available options.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_time::Timer;
    ///
    /// # fn main() -> Result<(), tally_time::Error> {
    /// let mut timer = Timer::new();
    ///
    /// // Prints "load config: 0.000 seconds" or similar.
    /// timer.watch_and_report("load config").run(|| ())?;
    ///
    /// assert!(timer.get_time("load config").is_ok());
    /// # Ok(())
    /// # }
    /// ```
    pub fn watch_and_report<'p>(&mut self, message: impl Into<String>) -> WatchAndReport<'_, 'p> {
        WatchAndReport::with_timer(message.into(), self)
    }

    /// Prepares a report of the accumulated time of every category.
    ///
    /// See [`ReportBuilder`] for the available options.
    pub fn report<'p>(&self) -> ReportBuilder<'_, 'p> {
        ReportBuilder::new(self)
    }

    /// Returns the accumulated time of `category`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] if the category was never started on this timer.
    pub fn get_time(&self, category: &str) -> Result<Duration> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, total)| *total)
            .ok_or_else(|| Error::UnknownCategory {
                category: category.to_owned(),
            })
    }

    /// Adds the accumulated time of every category of `other` to this timer.
    ///
    /// Categories missing from this timer are appended in the order `other` knows them.
    /// `other` is not modified. Merging the same timer twice counts its time twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_time::Timer;
    ///
    /// let mut first = Timer::new();
    /// first.watch("io", || std::hint::black_box(1));
    ///
    /// let mut second = Timer::new();
    /// second.watch("io", || std::hint::black_box(2));
    /// second.watch("compute", || std::hint::black_box(3));
    ///
    /// let expected_io = first.get_time("io").unwrap() + second.get_time("io").unwrap();
    /// first.merge(&second);
    ///
    /// assert_eq!(first.get_time("io").unwrap(), expected_io);
    /// assert_eq!(first.len(), 2);
    /// ```
    pub fn merge(&mut self, other: &Self) -> &mut Self {
        for (category, total) in other.categories() {
            self.accumulate(category, total);
        }

        tracing::debug!(
            categories = other.len(),
            "merged timer into accumulated totals"
        );

        self
    }

    /// Returns the categories and their accumulated time, in the order they were first started.
    pub fn categories(&self) -> impl Iterator<Item = (&str, Duration)> {
        self.categories
            .iter()
            .map(|(name, total)| (name.as_str(), *total))
    }

    /// Returns the number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether no category has been started on this timer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Adds `elapsed` to the total of `category`, creating the category if needed.
    pub(crate) fn accumulate(&mut self, category: &str, elapsed: Duration) {
        let total = self.entry(category);

        *total = total.checked_add(elapsed).expect(
            "time accumulation overflows Duration - this indicates an unrealistic scenario",
        );
    }

    fn entry(&mut self, category: &str) -> &mut Duration {
        let index = match self.categories.iter().position(|(name, _)| name == category) {
            Some(index) => index,
            None => {
                self.categories.push((category.to_owned(), Duration::ZERO));
                self.categories.len().saturating_sub(1)
            }
        };

        &mut self
            .categories
            .get_mut(index)
            .expect("index was just found or pushed")
            .1
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in report_lines(self, DEFAULT_PRECISION) {
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}
