//! The data line shared between the host and the sensor.
//!
//! The protocol uses a single wire in both directions: the host drives it
//! to send the start signal and then releases it so the sensor can answer.

use embedded_hal::digital::{InputPin, OutputPin, PinState};

/// Direction of the data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The host drives the line.
    Output,
    /// The host releases the line and samples it.
    Input,
}

/// A GPIO line that can be switched between driving and sampling.
///
/// Every call is expected to complete well under a microsecond, since the
/// decoder measures pulses a few tens of microseconds wide.
pub trait Line {
    /// Error returned by the underlying hardware.
    type Error;

    /// Switches the line direction.
    ///
    /// # Errors
    ///
    /// Returns the hardware error if the direction cannot be changed.
    fn set_mode(&mut self, mode: Mode) -> Result<(), Self::Error>;

    /// Drives the line to the given level.
    ///
    /// # Errors
    ///
    /// Returns the hardware error if the level cannot be written.
    fn write(&mut self, level: PinState) -> Result<(), Self::Error>;

    /// Samples the current line level.
    ///
    /// # Errors
    ///
    /// Returns the hardware error if the level cannot be read.
    fn read(&mut self) -> Result<PinState, Self::Error>;
}

impl<L: Line + ?Sized> Line for &mut L {
    type Error = L::Error;

    #[inline]
    fn set_mode(&mut self, mode: Mode) -> Result<(), Self::Error> {
        (**self).set_mode(mode)
    }

    #[inline]
    fn write(&mut self, level: PinState) -> Result<(), Self::Error> {
        (**self).write(level)
    }

    #[inline]
    fn read(&mut self) -> Result<PinState, Self::Error> {
        (**self).read()
    }
}

/// A [`Line`] built on an open-drain [`embedded-hal`] pin.
///
/// An open-drain pin has no separate input mode: writing a high level
/// releases the line to the pull-up resistor, so switching to
/// [`Mode::Input`] is a write of [`PinState::High`].
///
/// [`embedded-hal`]: https://crates.io/crates/embedded-hal
pub struct OpenDrainLine<P> {
    pin: P,
}

impl<P> OpenDrainLine<P>
where
    P: InputPin + OutputPin,
{
    /// Creates an [`OpenDrainLine`] for the given pin.
    #[must_use]
    pub const fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Returns the wrapped pin.
    #[must_use]
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> Line for OpenDrainLine<P>
where
    P: InputPin + OutputPin,
{
    type Error = P::Error;

    fn set_mode(&mut self, mode: Mode) -> Result<(), Self::Error> {
        match mode {
            Mode::Output => Ok(()),
            Mode::Input => self.pin.set_high(),
        }
    }

    #[inline]
    fn write(&mut self, level: PinState) -> Result<(), Self::Error> {
        self.pin.set_state(level)
    }

    #[inline]
    fn read(&mut self) -> Result<PinState, Self::Error> {
        Ok(PinState::from(self.pin.is_high()?))
    }
}
