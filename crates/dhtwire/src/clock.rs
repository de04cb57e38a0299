//! Monotonic time used to measure pulses and to bound every busy-wait.

use core::time::Duration;

/// A monotonic time source.
///
/// The returned value is the time elapsed since an arbitrary, fixed origin.
/// It must never go backwards.
pub trait Clock {
    /// Returns the current time since the clock origin.
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// A time budget started at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Duration,
    budget: Duration,
}

impl Deadline {
    /// Starts a [`Deadline`] with the given budget at the current time.
    #[must_use]
    #[inline]
    pub fn start<C: Clock + ?Sized>(clock: &C, budget: Duration) -> Self {
        Self {
            start: clock.now(),
            budget,
        }
    }

    /// Returns the time elapsed since the deadline was started.
    #[must_use]
    #[inline]
    pub fn elapsed<C: Clock + ?Sized>(&self, clock: &C) -> Duration {
        clock.now().saturating_sub(self.start)
    }

    /// Whether the elapsed time has exceeded the budget.
    #[must_use]
    #[inline]
    pub fn expired<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        self.elapsed(clock) > self.budget
    }
}
