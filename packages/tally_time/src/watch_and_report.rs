//! Measuring a block of work and reporting its duration right away.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use scopeguard::ScopeGuard;

use crate::pal::{Platform, PlatformFacade};
use crate::{Error, Output, Timer, TimingSession};

/// Prepares to measure a block of work and report its duration, without any [`Timer`].
///
/// Nothing is accumulated anywhere: the duration is printed (and optionally appended to a CSV
/// file) and then forgotten. Use [`Timer::watch_and_report()`] to also add it to a timer.
///
/// # Examples
///
/// ```
/// use tally_time::watch_and_report;
///
/// # fn main() -> Result<(), tally_time::Error> {
/// // Prints "load assets: ..." followed by "load assets: 0.000 seconds" or similar.
/// let count = watch_and_report("load assets").preprint(true).run(|| 3)?;
///
/// assert_eq!(count, 3);
/// # Ok(())
/// # }
/// ```
pub fn watch_and_report<'p>(message: impl Into<String>) -> WatchAndReport<'static, 'p> {
    WatchAndReport::transient(message.into(), PlatformFacade::real())
}

/// Builder for measuring a block of work and reporting its duration as soon as it completes.
///
/// Created by [`watch_and_report()`] or [`Timer::watch_and_report()`]. The work is executed by
/// [`run()`](Self::run) or [`try_run()`](Self::try_run), which print
/// `"{message}: {seconds} seconds"` once the work is done.
///
/// The duration is recorded and printed even if the work returns an error or panics. With
/// [`try_run()`](Self::try_run), the CSV file only receives a row when the work succeeds.
#[derive(Debug)]
#[must_use = "the work is only measured when run() or try_run() is called"]
pub struct WatchAndReport<'t, 'p> {
    message: String,
    timer: Option<&'t mut Timer>,
    platform: PlatformFacade,
    output: Output<'p>,
    preprint: bool,
    disable: bool,
}

impl<'t, 'p> WatchAndReport<'t, 'p> {
    pub(crate) fn with_timer(message: String, timer: &'t mut Timer) -> Self {
        let platform = timer.platform().clone();
        Self::new(message, Some(timer), platform)
    }

    pub(crate) fn transient(message: String, platform: PlatformFacade) -> Self {
        Self::new(message, None, platform)
    }

    fn new(message: String, timer: Option<&'t mut Timer>, platform: PlatformFacade) -> Self {
        Self {
            message,
            timer,
            platform,
            output: Output::new(),
            preprint: false,
            disable: false,
        }
    }

    /// Sends each line to `printer` instead of stdout.
    ///
    /// Lines are passed without a trailing newline.
    pub fn print_with(mut self, printer: impl FnMut(&str) + 'p) -> Self {
        self.output.set_printer(printer);
        self
    }

    /// Whether to print `"{message}: ..."` before the work starts. Defaults to `false`.
    ///
    /// Useful to show that long-running work has started. The measurement starts before the
    /// announcement is printed, so the time spent printing it is included in the duration.
    pub fn preprint(mut self, preprint: bool) -> Self {
        self.preprint = preprint;
        self
    }

    /// Sets the number of decimal places used to display seconds. Defaults to 3.
    ///
    /// The precision only affects printed lines; the CSV file always receives unrounded values.
    pub fn precision(mut self, precision: usize) -> Self {
        self.output.set_precision(precision);
        self
    }

    /// Also appends a `message,time` row to the CSV file at `path` when the work succeeds.
    ///
    /// Missing parent directories are created. A `name,time` header row is written first if the
    /// file does not exist yet.
    pub fn append_to_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.set_append_to_file(path.into());
        self
    }

    /// Whether to skip measuring and reporting entirely. Defaults to `false`.
    ///
    /// A disabled builder runs the work and returns its result without printing, writing or
    /// recording anything, so instrumentation can be switched off without changing call sites.
    pub fn disable(mut self, disable: bool) -> Self {
        self.disable = disable;
        self
    }

    /// Runs `work`, then reports how long it took.
    ///
    /// `work` may return anything, its value is returned unchanged. The CSV row, if configured,
    /// is always written. If `work` panics, the duration is still printed and recorded before
    /// the panic continues.
    ///
    /// Use [`try_run()`](Self::try_run) for fallible work that should not be logged to the CSV
    /// file when it fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the CSV file cannot be written. The value of `work` is lost in
    /// that case.
    pub fn run<F, R>(self, work: F) -> Result<R, Error>
    where
        F: FnOnce() -> R,
    {
        match self.measure(work) {
            Measured::Disabled(value) => Ok(value),
            Measured::Reported {
                value,
                message,
                output,
                elapsed,
            } => {
                output.append([(message.as_str(), elapsed)])?;
                Ok(value)
            }
        }
    }

    /// Runs fallible `work`, then reports how long it took.
    ///
    /// The result of `work` is returned unchanged. If `work` fails, its error is returned after
    /// the duration has been printed (and added to the timer, if any) and no CSV row is written.
    /// If `work` panics, the duration is still printed and recorded before the panic continues.
    ///
    /// # Errors
    ///
    /// Returns the error of `work`, or [`Error::Io`] converted into `E` if the work succeeded
    /// but the CSV file cannot be written.
    pub fn try_run<F, T, E>(self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<Error>,
    {
        match self.measure(work) {
            Measured::Disabled(result) => result,
            Measured::Reported {
                value,
                message,
                output,
                elapsed,
            } => {
                let value = value?;
                output.append([(message.as_str(), elapsed)])?;
                Ok(value)
            }
        }
    }

    /// Runs `work` between the start and the end of the measurement and prints the elapsed line.
    fn measure<F, R>(self, work: F) -> Measured<'p, R>
    where
        F: FnOnce() -> R,
    {
        let Self {
            message,
            timer,
            platform,
            mut output,
            preprint,
            disable,
        } = self;

        if disable {
            return Measured::Disabled(work());
        }

        let measurement = match timer {
            Some(timer) => Measurement::Tracked(timer.start(message.as_str())),
            None => Measurement::Transient {
                started: platform.now(),
                platform,
            },
        };

        // The announcement is part of the measured time.
        if preprint {
            output.print(&format!("{message}: ..."));
        }

        // Only fires if `work` unwinds; the regular path defuses it below.
        let report_on_unwind = scopeguard::guard(
            (measurement, output),
            |(measurement, mut output)| {
                output.print_elapsed(&message, measurement.stop());
            },
        );

        let value = work();

        let (measurement, mut output) = ScopeGuard::into_inner(report_on_unwind);
        let elapsed = measurement.stop();
        output.print_elapsed(&message, elapsed);

        Measured::Reported {
            value,
            message,
            output,
            elapsed,
        }
    }
}

/// The outcome of running work through [`WatchAndReport`], before the CSV row is written.
#[derive(Debug)]
enum Measured<'p, R> {
    Disabled(R),
    Reported {
        value: R,
        message: String,
        output: Output<'p>,
        elapsed: Duration,
    },
}

/// A measurement that is either settled into a timer or only reported.
#[derive(Debug)]
enum Measurement<'t> {
    Tracked(TimingSession<'t>),
    Transient {
        platform: PlatformFacade,
        started: Instant,
    },
}

impl Measurement<'_> {
    fn stop(self) -> Duration {
        match self {
            Self::Tracked(session) => session.finish().1,
            Self::Transient { platform, started } => {
                platform.now().saturating_duration_since(started)
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fs;
    use std::panic::{self, AssertUnwindSafe};

    use super::*;
    use crate::pal::FakePlatform;

    #[derive(Debug, PartialEq)]
    enum WorkError {
        Failed,
        Timing,
    }

    impl From<Error> for WorkError {
        fn from(_: Error) -> Self {
            Self::Timing
        }
    }

    fn create_test_timer() -> (Timer, FakePlatform) {
        let fake_platform = FakePlatform::new();
        let timer = Timer::with_platform(PlatformFacade::fake(fake_platform.clone()));
        (timer, fake_platform)
    }

    #[test]
    fn reports_elapsed_time_with_default_precision() {
        let clock = FakePlatform::new();
        let mut lines = Vec::new();

        let result = WatchAndReport::transient("task".to_owned(), PlatformFacade::fake(clock.clone()))
            .print_with(|line| lines.push(line.to_owned()))
            .try_run(|| {
                clock.advance(Duration::from_millis(100));
                Ok::<_, WorkError>("done")
            });

        assert_eq!(result, Ok("done"));
        assert_eq!(lines, ["task: 0.100 seconds"]);
    }

    #[test]
    fn preprint_announces_work_first() {
        let clock = FakePlatform::new();
        let mut lines = Vec::new();

        WatchAndReport::transient("slow".to_owned(), PlatformFacade::fake(clock.clone()))
            .preprint(true)
            .precision(1)
            .print_with(|line| lines.push(line.to_owned()))
            .try_run(|| {
                clock.advance(Duration::from_secs(2));
                Ok::<_, WorkError>(())
            })
            .unwrap();

        assert_eq!(lines, ["slow: ...", "slow: 2.0 seconds"]);
    }

    #[test]
    fn timer_variant_adds_to_category() {
        let (mut timer, clock) = create_test_timer();

        for _ in 0..2 {
            timer
                .watch_and_report("step")
                .print_with(|_| {})
                .try_run(|| {
                    clock.advance(Duration::from_millis(30));
                    Ok::<_, WorkError>(())
                })
                .unwrap();
        }

        assert_eq!(timer.get_time("step").unwrap(), Duration::from_millis(60));
    }

    #[test]
    fn timer_variant_reports_this_session_only() {
        let (mut timer, clock) = create_test_timer();
        let session = timer.start("step");
        clock.advance(Duration::from_secs(5));
        session.end();

        let mut lines = Vec::new();
        timer
            .watch_and_report("step")
            .print_with(|line| lines.push(line.to_owned()))
            .try_run(|| {
                clock.advance(Duration::from_millis(250));
                Ok::<_, WorkError>(())
            })
            .unwrap();

        assert_eq!(lines, ["step: 0.250 seconds"]);
        assert_eq!(timer.get_time("step").unwrap(), Duration::from_millis(5250));
    }

    #[test]
    fn error_is_reported_and_passed_through() {
        let (mut timer, clock) = create_test_timer();
        let mut lines = Vec::new();

        let result: Result<(), WorkError> = timer
            .watch_and_report("failing")
            .print_with(|line| lines.push(line.to_owned()))
            .try_run(|| {
                clock.advance(Duration::from_millis(10));
                Err(WorkError::Failed)
            });

        assert_eq!(result, Err(WorkError::Failed));
        assert_eq!(lines, ["failing: 0.010 seconds"]);
        assert_eq!(timer.get_time("failing").unwrap(), Duration::from_millis(10));
    }

    #[test]
    fn disabled_runs_work_without_side_effects() {
        let (mut timer, _clock) = create_test_timer();
        let mut lines = Vec::new();

        let result: Result<(), WorkError> = timer
            .watch_and_report("quiet")
            .preprint(true)
            .disable(true)
            .print_with(|line| lines.push(line.to_owned()))
            .try_run(|| Err(WorkError::Failed));

        assert_eq!(result, Err(WorkError::Failed));
        assert!(lines.is_empty());
        assert!(timer.is_empty());
    }

    #[test]
    #[cfg_attr(miri, ignore)] // Unwinding through the guard is slow under Miri.
    fn panic_still_reports_and_records() {
        let (mut timer, clock) = create_test_timer();
        let mut lines = Vec::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            timer
                .watch_and_report("boom")
                .print_with(|line| lines.push(line.to_owned()))
                .try_run(|| -> Result<(), WorkError> {
                    clock.advance(Duration::from_millis(40));
                    panic!("work failed");
                })
        }));

        assert!(outcome.is_err());
        assert_eq!(lines, ["boom: 0.040 seconds"]);
        assert_eq!(timer.get_time("boom").unwrap(), Duration::from_millis(40));
    }

    #[test]
    #[cfg(not(miri))] // Miri cannot use the real file system.
    fn successful_runs_append_rows_with_single_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("times.csv");
        let clock = FakePlatform::new();

        for millis in [500, 1500] {
            WatchAndReport::transient("job".to_owned(), PlatformFacade::fake(clock.clone()))
                .print_with(|_| {})
                .precision(0)
                .append_to_file(&path)
                .try_run(|| {
                    clock.advance(Duration::from_millis(millis));
                    Ok::<_, WorkError>(())
                })
                .unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "name,time\njob,0.5\njob,1.5\n");
    }

    #[test]
    #[cfg(not(miri))] // Miri cannot use the real file system.
    fn failed_run_writes_no_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("times.csv");

        let result: Result<(), WorkError> = WatchAndReport::transient(
            "job".to_owned(),
            PlatformFacade::fake(FakePlatform::new()),
        )
        .print_with(|_| {})
        .append_to_file(&path)
        .try_run(|| Err(WorkError::Failed));

        assert_eq!(result, Err(WorkError::Failed));
        assert!(!path.exists());
    }

    #[test]
    #[cfg(not(miri))] // Miri cannot use the real file system.
    fn file_sink_failure_is_converted_into_work_error() {
        let dir = tempfile::tempdir().unwrap();

        // A directory cannot be opened for appending.
        let result = WatchAndReport::transient(
            "job".to_owned(),
            PlatformFacade::fake(FakePlatform::new()),
        )
        .print_with(|_| {})
        .append_to_file(dir.path())
        .try_run(|| Ok::<_, WorkError>(()));

        assert_eq!(result, Err(WorkError::Timing));
    }

    #[test]
    fn run_passes_through_plain_value() {
        let clock = FakePlatform::new();
        let mut lines = Vec::new();

        let value = WatchAndReport::transient("sum".to_owned(), PlatformFacade::fake(clock.clone()))
            .print_with(|line| lines.push(line.to_owned()))
            .run(|| {
                clock.advance(Duration::from_millis(75));
                "five"
            })
            .unwrap();

        assert_eq!(value, "five");
        assert_eq!(lines, ["sum: 0.075 seconds"]);
    }

    #[test]
    fn run_passes_through_foreign_error_unchanged() {
        let (mut timer, clock) = create_test_timer();

        let outcome = timer
            .watch_and_report("parse")
            .print_with(|_| {})
            .run(|| {
                clock.advance(Duration::from_millis(15));
                "not a number".parse::<u32>()
            })
            .unwrap();

        assert!(outcome.is_err());
        assert_eq!(timer.get_time("parse").unwrap(), Duration::from_millis(15));
    }

    #[test]
    fn preprint_is_part_of_measurement() {
        let clock = FakePlatform::new();
        let mut lines = Vec::new();

        WatchAndReport::transient("slow".to_owned(), PlatformFacade::fake(clock.clone()))
            .preprint(true)
            .print_with(|line| {
                if line.ends_with("...") {
                    clock.advance(Duration::from_millis(20));
                }
                lines.push(line.to_owned());
            })
            .run(|| clock.advance(Duration::from_millis(30)))
            .unwrap();

        assert_eq!(lines, ["slow: ...", "slow: 0.050 seconds"]);
    }

    #[test]
    fn disabled_run_returns_value() {
        let (mut timer, _clock) = create_test_timer();
        let mut lines = Vec::new();

        let value = timer
            .watch_and_report("quiet")
            .disable(true)
            .print_with(|line| lines.push(line.to_owned()))
            .run(|| "value")
            .unwrap();

        assert_eq!(value, "value");
        assert!(lines.is_empty());
        assert!(timer.is_empty());
    }

    #[test]
    #[cfg(not(miri))] // Miri cannot use the real file system.
    fn run_appends_row_whatever_the_work_returns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("times.csv");
        let missing = dir.path().join("missing.bin");

        let read = WatchAndReport::transient(
            "read".to_owned(),
            PlatformFacade::fake(FakePlatform::new()),
        )
        .print_with(|_| {})
        .append_to_file(&path)
        .run(|| fs::read(&missing))
        .unwrap();

        assert!(read.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,time\nread,0.0\n");
    }

    #[test]
    #[cfg(not(miri))] // Miri cannot use the real file system.
    fn run_returns_file_sink_failure() {
        let dir = tempfile::tempdir().unwrap();

        let result = WatchAndReport::transient(
            "job".to_owned(),
            PlatformFacade::fake(FakePlatform::new()),
        )
        .print_with(|_| {})
        .append_to_file(dir.path())
        .run(|| ());

        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
