//! Where and how timing results are emitted.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::Result;
use crate::csv_sink;

/// Number of decimal places used when displaying seconds, unless configured otherwise.
pub(crate) const DEFAULT_PRECISION: usize = 3;

/// The sinks shared by the report and watch builders: a line printer for human-readable output
/// and an optional CSV file that receives the unrounded values.
pub(crate) struct Output<'p> {
    printer: Box<dyn FnMut(&str) + 'p>,
    precision: usize,
    append_to_file: Option<PathBuf>,
}

impl<'p> Output<'p> {
    /// Prints to stdout with the default precision and no CSV file.
    #[cfg_attr(test, mutants::skip)] // Tests always replace the stdout printer.
    pub(crate) fn new() -> Self {
        Self {
            printer: Box::new(|line: &str| println!("{line}")),
            precision: DEFAULT_PRECISION,
            append_to_file: None,
        }
    }

    pub(crate) fn set_printer(&mut self, printer: impl FnMut(&str) + 'p) {
        self.printer = Box::new(printer);
    }

    pub(crate) fn set_precision(&mut self, precision: usize) {
        self.precision = precision;
    }

    pub(crate) fn set_append_to_file(&mut self, path: PathBuf) {
        self.append_to_file = Some(path);
    }

    pub(crate) fn print(&mut self, line: &str) {
        (self.printer)(line);
    }

    /// Prints `"{name}: {seconds} seconds"` with the configured precision.
    pub(crate) fn print_elapsed(&mut self, name: &str, elapsed: Duration) {
        let line = elapsed_line(name, elapsed, self.precision);
        self.print(&line);
    }

    /// Appends the rows to the CSV file, if one is configured.
    pub(crate) fn append<'a>(
        &self,
        rows: impl IntoIterator<Item = (&'a str, Duration)>,
    ) -> Result<()> {
        match &self.append_to_file {
            Some(path) => csv_sink::append_rows(path, rows),
            None => Ok(()),
        }
    }

    pub(crate) fn precision(&self) -> usize {
        self.precision
    }
}

impl fmt::Debug for Output<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("precision", &self.precision)
            .field("append_to_file", &self.append_to_file)
            .finish_non_exhaustive()
    }
}

/// Formats a single result line, e.g. `parse: 0.120 seconds`.
pub(crate) fn elapsed_line(name: &str, elapsed: Duration, precision: usize) -> String {
    format!("{name}: {:.precision$} seconds", elapsed.as_secs_f64())
}
