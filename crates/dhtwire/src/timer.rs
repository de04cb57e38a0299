//! Measures how long the line stays at a level.
//!
//! Every wait is bounded by a wall-clock deadline rather than by a number
//! of polls, so the outcome does not depend on how fast the host spins.

use core::time::Duration;

use embedded_hal::digital::PinState;

use crate::clock::{Clock, Deadline};
use crate::line::Line;

/// A pulse observed on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    /// Time elapsed until the line left the level.
    pub elapsed: Duration,
    /// Number of samples taken at the level.
    pub polls: u32,
}

/// The line stayed at a level longer than the allowed budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    /// The level the line was stuck at.
    pub level: PinState,
    /// Time elapsed before giving up.
    pub elapsed: Duration,
    /// Number of samples taken at the level.
    pub polls: u32,
}

/// Errors that may occur while waiting on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError<E> {
    /// Line errors.
    Line(E),
    /// The deadline expired.
    Timeout(Timeout),
}

impl<E> From<E> for WaitError<E> {
    fn from(e: E) -> Self {
        WaitError::Line(e)
    }
}

/// Busy-waits while the line reads `level`, for at most `budget`.
///
/// Returns the width of the pulse as soon as a different level is sampled.
///
/// # Errors
///
/// Returns [`WaitError::Timeout`] once the budget is exceeded, or the line
/// error if sampling fails.
pub fn wait_while<L, C>(
    line: &mut L,
    clock: &C,
    level: PinState,
    budget: Duration,
) -> Result<Pulse, WaitError<L::Error>>
where
    L: Line + ?Sized,
    C: Clock + ?Sized,
{
    let deadline = Deadline::start(clock, budget);
    let mut polls: u32 = 0;

    loop {
        if line.read()? != level {
            return Ok(Pulse {
                elapsed: deadline.elapsed(clock),
                polls,
            });
        }
        polls = polls.saturating_add(1);

        if deadline.expired(clock) {
            return Err(WaitError::Timeout(Timeout {
                level,
                elapsed: deadline.elapsed(clock),
                polls,
            }));
        }
        core::hint::spin_loop();
    }
}
