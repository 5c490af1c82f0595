//! Wall-clock time tallies per named category.
//!
//! This package measures how much wall-clock time a program spends in named categories of work,
//! summing up repeated measurements of the same category. The accumulated totals can be printed
//! as a human-readable report and appended to a CSV log file.
//!
//! The core functionality includes:
//! - [`Timer`] - Owns the accumulated time of each category and combines results of other timers
//! - [`TimingSession`] - One in-progress measurement of a category, settled into its timer
//! - [`WatchAndReport`] - Measures a block of work and immediately reports how long it took
//! - [`ReportBuilder`] - Prints the totals of a timer and optionally logs them to a CSV file
//!
//! This is a development aid for ad-hoc instrumentation, not a tracing or profiling system.
//!
//! # Simple usage
//!
//! ```
//! use tally_time::Timer;
//!
//! let mut timer = Timer::new();
//!
//! for _ in 0..3 {
//!     timer.watch("parse", || {
//!         // Work done here is added to the "parse" category.
//!         std::hint::black_box(42 * 2);
//!     });
//! }
//!
//! let session = timer.start("render");
//! // Work done here is added to the "render" category.
//! session.end();
//!
//! assert!(timer.get_time("parse").is_ok());
//!
//! // Prints "Runtime report:" followed by one line per category.
//! timer.report().emit().unwrap();
//! ```
//!
//! # Reporting a single block of work
//!
//! The free function [`watch_and_report()`] measures a block and prints the result without
//! needing a timer at all. The same builder is available on a timer via
//! [`Timer::watch_and_report()`], which additionally adds the duration to the timer.
//!
//! ```
//! use tally_time::watch_and_report;
//!
//! # fn main() -> Result<(), tally_time::Error> {
//! let mut lines = Vec::new();
//!
//! let answer = watch_and_report("compute answer")
//!     .precision(2)
//!     .print_with(|line| lines.push(line.to_owned()))
//!     .run(|| 42)?;
//!
//! assert_eq!(answer, 42);
//! assert!(lines[0].starts_with("compute answer: 0.0"));
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! A [`Timer`] is mutated through `&mut` and is therefore used by one thread at a time. To measure
//! work running on multiple threads, give each thread its own timer and combine them with
//! [`Timer::merge()`] once the threads have finished:
//!
//! ```
//! use std::thread;
//!
//! use tally_time::Timer;
//!
//! let workers: Vec<_> = (0..4)
//!     .map(|_| {
//!         thread::spawn(|| {
//!             let mut timer = Timer::new();
//!             timer.watch("work", || std::hint::black_box(42));
//!             timer
//!         })
//!     })
//!     .collect();
//!
//! let mut total = Timer::new();
//! for worker in workers {
//!     total.merge(&worker.join().unwrap());
//! }
//! ```
//!
//! # Shared instance
//!
//! For quick instrumentation without passing a timer around, [`Timer::with_instance()`] provides
//! a lazily created timer that is shared by all code running on the current thread.

mod csv_sink;
mod error;
mod output;
mod pal;
mod report_builder;
mod timer;
mod timing_session;
mod watch_and_report;

pub use error::Error;
pub(crate) use error::Result;
pub(crate) use output::Output;
pub use report_builder::ReportBuilder;
pub use timer::Timer;
pub use timing_session::TimingSession;
pub use watch_and_report::{WatchAndReport, watch_and_report};

/// The category used by callers that do not need more than one category.
pub const DEFAULT_CATEGORY: &str = "default";

/// The line printed instead of a report when a timer has no categories.
pub const NOTHING_TO_REPORT: &str = "--- Nothing to report ---";
