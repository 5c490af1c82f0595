//! Combining the timers of multiple threads with `Timer::merge()`.
//!
//! Each worker thread owns a private `Timer` and returns it when done. The main thread merges
//! them: categories recorded by several workers are summed, the others are simply carried over.
//!
//! Run with: `cargo run --example tally_time_threaded_merge`
#![expect(
    clippy::arithmetic_side_effects,
    reason = "this is example code that does not need production-level safety"
)]

use std::thread;
use std::time::Duration;

use tally_time::{Error, Timer};

fn main() -> Result<(), Error> {
    let handles: Vec<_> = (1..=3_u64)
        .map(|worker_index| thread::spawn(move || worker(worker_index)))
        .collect();

    let mut total = Timer::new();

    for (index, handle) in handles.into_iter().enumerate() {
        let timer = handle.join().expect("worker thread should not panic");

        println!("Worker {}:", index + 1);
        timer.report().emit()?;
        println!();

        total.merge(&timer);
    }

    println!("Merged:");
    total.report().emit()?;

    Ok(())
}

/// Simulates a worker that spends a different amount of time on shared and unique work.
fn worker(worker_index: u64) -> Timer {
    let mut timer = Timer::new();

    timer.watch("common_work", || {
        thread::sleep(Duration::from_millis(10 * worker_index));
    });

    timer.watch(format!("unique_work_{worker_index}"), || {
        thread::sleep(Duration::from_millis(5));
    });

    timer
}
