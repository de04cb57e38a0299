//! # DHT11 Driver
//!
//! This module provides an architecture-agnostic driver for the `DHT11`
//! temperature and humidity sensor.
//! The driver is synchronous and blocking: a cycle takes the 18 ms start
//! signal plus a few milliseconds of data transfer, during which the driver
//! has exclusive use of the line.
//!
//! The `DHT11` sensor provides the following measurements:
//! - **Humidity**: Relative humidity as a percentage (% RH)
//! - **Temperature**: Temperature in degrees Celsius (°C)
//!
//! For detailed specifications, refer to the
//! [datasheet](https://www.mouser.com/datasheet/2/758/DHT11-Technical-Data-Sheet-Translated-Version-1143054.pdf).

use embedded_hal::delay::DelayNs;

use crate::checksum;
use crate::clock::Clock;
use crate::config::DecoderConfig;
use crate::convert::{to_humidity, to_temperature};
use crate::decoder::read_byte;
use crate::diagnostics::{CycleDiagnostics, DiagnosticsSink, NoDiagnostics};
use crate::error::ReadError;
use crate::frame::{ByteField, FRAME_BYTES, Frame, assemble};
use crate::handshake::perform_handshake;
use crate::line::Line;

/// A single validated humidity and temperature measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius (°C).
    pub temperature: f32,
    /// Relative humidity as a percentage (% RH).
    pub humidity: f32,
}

impl Reading {
    /// Converts the data bytes of a frame.
    ///
    /// The checksum is not looked at: validate the frame first.
    #[must_use]
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            temperature: to_temperature(frame.temperature_int, frame.temperature_frac),
            humidity: to_humidity(frame.humidity_int, frame.humidity_frac),
        }
    }
}

/// The `DHT11` driver.
///
/// Owns the line for its whole lifetime. No protocol state is kept between
/// cycles: every [`Dht11::read`] starts again from the handshake.
pub struct Dht11<L, C, D, S = NoDiagnostics>
where
    L: Line,
    C: Clock,
    D: DelayNs,
    S: DiagnosticsSink,
{
    line: L,
    clock: C,
    delay: D,
    diagnostics: S,
    config: DecoderConfig,
}

impl<L, C, D> Dht11<L, C, D>
where
    L: Line,
    C: Clock,
    D: DelayNs,
{
    /// Creates a [`Dht11`] driver for the given line, clock and delay
    /// provider.
    #[must_use]
    pub fn new(line: L, clock: C, delay: D, config: DecoderConfig) -> Self {
        Self {
            line,
            clock,
            delay,
            diagnostics: NoDiagnostics,
            config,
        }
    }
}

impl<L, C, D, S> Dht11<L, C, D, S>
where
    L: Line,
    C: Clock,
    D: DelayNs,
    S: DiagnosticsSink,
{
    /// Routes cycle diagnostics to the given sink.
    ///
    /// The sink is only called when [`DecoderConfig::diagnostics`] is set.
    #[must_use]
    pub fn with_diagnostics<T: DiagnosticsSink>(self, diagnostics: T) -> Dht11<L, C, D, T> {
        Dht11 {
            line: self.line,
            clock: self.clock,
            delay: self.delay,
            diagnostics,
            config: self.config,
        }
    }

    /// The decoder configuration.
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Reads a single humidity and temperature measurement.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Driving or sampling the line fails
    /// - The sensor does not acknowledge the start signal in time
    /// - Any bit exceeds its deadline
    /// - The received data fails checksum validation
    pub fn read(&mut self) -> Result<Reading, ReadError<L::Error>> {
        let frame = self.read_frame()?;
        Ok(Reading::from_frame(&frame))
    }

    /// Runs a read cycle and returns the validated raw frame.
    ///
    /// # Errors
    ///
    /// Same as [`Dht11::read`].
    pub fn read_frame(&mut self) -> Result<Frame, ReadError<L::Error>> {
        let _ready = perform_handshake(
            &mut self.line,
            &self.clock,
            &mut self.delay,
            &self.config,
        )?;

        let mut diagnostics = CycleDiagnostics::default();
        let mut fields = [ByteField::default(); FRAME_BYTES];
        let mut timeouts: u8 = 0;

        // The whole frame is clocked in even after a timeout, so the
        // cycle always spans 40 bits.
        for (field, timings) in fields.iter_mut().zip(diagnostics.bits.iter_mut()) {
            let read = read_byte(&mut self.line, &self.clock, &self.config, timings)?;
            *field = read.field;
            timeouts += read.timeouts;
        }

        let frame = assemble(&fields);

        if self.config.diagnostics {
            diagnostics.frame = frame;
            self.diagnostics.cycle(&diagnostics);
        }

        if timeouts > 0 {
            return Err(ReadError::BitTimeout { bits: timeouts });
        }

        if !checksum::is_valid(&frame) {
            return Err(ReadError::ChecksumMismatch {
                expected: checksum::expected_checksum(&frame),
                received: frame.checksum,
            });
        }

        Ok(frame)
    }

    /// Releases the line, consuming the driver.
    #[must_use]
    pub fn release(self) -> L {
        self.line
    }
}
