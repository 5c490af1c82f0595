//! Runtime reports of the accumulated time of a timer.

use std::path::PathBuf;

use crate::output::elapsed_line;
use crate::{NOTHING_TO_REPORT, Output, Result, Timer};

/// Builder for printing the accumulated time of every category of a [`Timer`].
///
/// Created by [`Timer::report()`]. Nothing is printed until [`emit()`](Self::emit) is called.
///
/// The report is a `Runtime report:` header followed by one tab-indented line per category, in
/// the order the categories were first started. A timer without categories is reported as
/// `--- Nothing to report ---`.
///
/// # Examples
///
/// ```
/// use tally_time::Timer;
///
/// # fn main() -> Result<(), tally_time::Error> {
/// let mut timer = Timer::new();
/// timer.watch("parse", || std::hint::black_box(1));
///
/// let mut lines = Vec::new();
/// timer
///     .report()
///     .precision(1)
///     .print_with(|line| lines.push(line.to_owned()))
///     .emit()?;
///
/// assert_eq!(lines, ["Runtime report:", "\tparse: 0.0 seconds"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use = "the report is only printed when emit() is called"]
pub struct ReportBuilder<'t, 'p> {
    timer: &'t Timer,
    output: Output<'p>,
}

impl<'t, 'p> ReportBuilder<'t, 'p> {
    pub(crate) fn new(timer: &'t Timer) -> Self {
        Self {
            timer,
            output: Output::new(),
        }
    }

    /// Sends each report line to `printer` instead of stdout.
    ///
    /// Lines are passed without a trailing newline.
    pub fn print_with(mut self, printer: impl FnMut(&str) + 'p) -> Self {
        self.output.set_printer(printer);
        self
    }

    /// Sets the number of decimal places used to display seconds. Defaults to 3.
    ///
    /// The precision only affects printed lines; the CSV file always receives unrounded values.
    pub fn precision(mut self, precision: usize) -> Self {
        self.output.set_precision(precision);
        self
    }

    /// Also appends one `name,time` row per category to the CSV file at `path`.
    ///
    /// Missing parent directories are created. A `name,time` header row is written first if the
    /// file does not exist yet. Nothing is written if the timer has no categories.
    pub fn append_to_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.set_append_to_file(path.into());
        self
    }

    /// Prints the report and appends it to the CSV file, if one was configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the CSV file cannot be written. The report has
    /// already been printed by then.
    pub fn emit(self) -> Result<()> {
        let Self { timer, mut output } = self;

        for line in report_lines(timer, output.precision()) {
            output.print(&line);
        }

        if timer.is_empty() {
            return Ok(());
        }

        output.append(timer.categories())
    }
}

/// The lines of the runtime report of `timer`, without line terminators.
pub(crate) fn report_lines(timer: &Timer, precision: usize) -> Vec<String> {
    if timer.is_empty() {
        return vec![NOTHING_TO_REPORT.to_owned()];
    }

    let mut lines = Vec::with_capacity(timer.len().saturating_add(1));
    lines.push("Runtime report:".to_owned());
    lines.extend(
        timer
            .categories()
            .map(|(category, total)| format!("\t{}", elapsed_line(category, total, precision))),
    );

    lines
}
