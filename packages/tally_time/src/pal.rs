//! Platform abstraction layer for the clock.
//!
//! This module allows switching between the real wall clock and a fake clock that tests advance
//! by hand, so accumulated durations can be asserted exactly.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::Platform;
pub(crate) use facade::PlatformFacade;
#[cfg(test)]
pub(crate) use fake::FakePlatform;
