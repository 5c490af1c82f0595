//! Demonstrates the key `tally_time` types working together.
//!
//! - `Timer`: accumulates time per category and prints a runtime report
//! - `TimingSession`: measures one category explicitly
//! - `watch_and_report`: measures a block of work and reports it right away
//!
//! Run with: `cargo run --example tally_time_basic`.

use std::hint::black_box;
use std::thread;
use std::time::Duration;

use tally_time::{Error, Timer, watch_and_report};

fn main() -> Result<(), Error> {
    let mut timer = Timer::new();

    // Repeated measurements of the same category add up.
    for i in 0..5_u64 {
        timer.watch("sleep", || thread::sleep(Duration::from_millis(i)));
    }

    // Explicit sessions can be chained.
    let session = timer.start("format");
    black_box(format!("{:?}", (0..1000).collect::<Vec<_>>()));
    let session = session.end().start("sum");
    black_box((0..1_000_000_u64).sum::<u64>());
    session.end();

    // Report a single block right away, also adding it to the timer.
    timer
        .watch_and_report("warm up")
        .preprint(true)
        .run(|| thread::sleep(Duration::from_millis(20)))?;

    timer.report().precision(4).emit()?;
    println!();

    // Without a timer, nothing is accumulated.
    let answer = watch_and_report("transient work")
        .precision(2)
        .run(|| 6 * 7)?;
    println!("The answer is {answer}");

    Ok(())
}
