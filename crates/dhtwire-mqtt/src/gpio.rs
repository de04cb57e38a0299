//! The Raspberry Pi backend of the data line.

use std::convert::Infallible;
use std::time::{Duration, Instant};

use dhtwire::clock::Clock;
use dhtwire::line::{Line, Mode};

use embedded_hal::digital::PinState;

use rppal::gpio::{Bias, Gpio, IoPin, Level, Mode as PinMode};

use tracing::{debug, info};

use crate::error::Result;

/// A GPIO line owned for the whole lifetime of the daemon.
///
/// The pin is reset to its original state when the line is dropped.
pub struct GpioLine {
    pin: IoPin,
}

impl GpioLine {
    /// Acquires the GPIO line with the given BCM number.
    ///
    /// The line is left driven high, the idle state of the bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO peripheral cannot be accessed or the
    /// pin is already in use.
    pub fn acquire(bcm: u8) -> Result<Self> {
        let mut pin = Gpio::new()?.get(bcm)?.into_io(PinMode::Output);
        pin.set_high();

        info!("Acquired GPIO {bcm} for the sensor data line");

        Ok(Self { pin })
    }

    /// Releases the line.
    pub fn release(self) {
        debug!("Releasing GPIO {}", self.pin.pin());
    }
}

impl Line for GpioLine {
    type Error = Infallible;

    fn set_mode(&mut self, mode: Mode) -> std::result::Result<(), Self::Error> {
        match mode {
            Mode::Output => self.pin.set_mode(PinMode::Output),
            Mode::Input => {
                self.pin.set_mode(PinMode::Input);
                self.pin.set_bias(Bias::PullUp);
            }
        }
        Ok(())
    }

    #[inline]
    fn write(&mut self, level: PinState) -> std::result::Result<(), Self::Error> {
        self.pin.write(match level {
            PinState::Low => Level::Low,
            PinState::High => Level::High,
        });
        Ok(())
    }

    #[inline]
    fn read(&mut self) -> std::result::Result<PinState, Self::Error> {
        Ok(match self.pin.read() {
            Level::Low => PinState::Low,
            Level::High => PinState::High,
        })
    }
}

/// A [`Clock`] backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    /// Creates a [`StdClock`] whose origin is the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_clock_is_monotonic() {
        let clock = StdClock::new();

        let first = clock.now();
        std::thread::sleep(Duration::from_millis(1));
        let second = clock.now();

        assert!(second >= first + Duration::from_millis(1));
    }
}
