//! Each bit is sent as a low gap followed by a high pulse. The width of
//! the high pulse carries the value: about 26–28 µs for a zero and about
//! 70 µs for a one.

use core::time::Duration;

use embedded_hal::digital::PinState;

use crate::clock::Clock;
use crate::config::DecoderConfig;
use crate::frame::{BITS_PER_BYTE, ByteField};
use crate::line::Line;
use crate::timer::{WaitError, wait_while};

/// A decoded bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Bit {
    /// A short high pulse.
    #[default]
    Zero,
    /// A long high pulse.
    One,
}

impl Bit {
    /// The numeric value of the bit.
    #[must_use]
    #[inline]
    pub const fn value(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

impl From<bool> for Bit {
    fn from(one: bool) -> Self {
        if one { Self::One } else { Self::Zero }
    }
}

/// Timing of a single bit, kept for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitTiming {
    /// Time spent waiting for the low gap to end.
    pub gap: Duration,
    /// Width of the high pulse.
    pub width: Duration,
    /// Whether either wait ran past the bit deadline.
    pub timed_out: bool,
}

/// Errors that may occur while reading a bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitError<E> {
    /// Line errors.
    Line(E),
    /// The gap or the high pulse exceeded the bit deadline.
    Timeout(BitTiming),
}

impl<E> From<E> for BitError<E> {
    fn from(e: E) -> Self {
        BitError::Line(e)
    }
}

/// A byte read from the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteRead {
    /// The decoded bits. Timed-out bits are recorded as [`Bit::Zero`].
    pub field: ByteField,
    /// Number of bits that timed out.
    pub timeouts: u8,
}

/// Classifies a high pulse width: widths at or above the threshold are a
/// one, narrower ones a zero.
#[must_use]
#[inline]
pub fn classify(width: Duration, threshold: Duration) -> Bit {
    Bit::from(width >= threshold)
}

/// Reads one bit: waits for the low gap to end, then measures the high
/// pulse and classifies it.
///
/// # Errors
///
/// Returns [`BitError::Timeout`] if the gap or the pulse exceeds
/// [`DecoderConfig::bit_timeout`], or the line error if sampling fails.
pub fn read_bit<L, C>(
    line: &mut L,
    clock: &C,
    config: &DecoderConfig,
) -> Result<(Bit, BitTiming), BitError<L::Error>>
where
    L: Line + ?Sized,
    C: Clock + ?Sized,
{
    let mut timing = BitTiming::default();

    match wait_while(line, clock, PinState::Low, config.bit_timeout) {
        Ok(gap) => timing.gap = gap.elapsed,
        Err(WaitError::Line(e)) => return Err(BitError::Line(e)),
        Err(WaitError::Timeout(timeout)) => {
            timing.gap = timeout.elapsed;
            timing.timed_out = true;
            return Err(BitError::Timeout(timing));
        }
    }

    match wait_while(line, clock, PinState::High, config.bit_timeout) {
        Ok(pulse) => {
            timing.width = pulse.elapsed;
            Ok((classify(pulse.elapsed, config.bit_threshold), timing))
        }
        Err(WaitError::Line(e)) => Err(BitError::Line(e)),
        Err(WaitError::Timeout(timeout)) => {
            // The sensor sometimes hangs with the line high.
            timing.width = timeout.elapsed;
            timing.timed_out = true;
            Err(BitError::Timeout(timing))
        }
    }
}

/// Reads eight bits, most significant first, storing their timings.
///
/// A bit that times out is recorded as a zero so the byte keeps its
/// width, and is counted in [`ByteRead::timeouts`].
///
/// # Errors
///
/// Returns the line error if sampling fails.
pub fn read_byte<L, C>(
    line: &mut L,
    clock: &C,
    config: &DecoderConfig,
    timings: &mut [BitTiming; BITS_PER_BYTE],
) -> Result<ByteRead, L::Error>
where
    L: Line + ?Sized,
    C: Clock + ?Sized,
{
    let mut read = ByteRead::default();

    for (bit, timing) in read.field.0.iter_mut().zip(timings.iter_mut()) {
        match read_bit(line, clock, config) {
            Ok((value, measured)) => {
                *bit = value;
                *timing = measured;
            }
            Err(BitError::Timeout(measured)) => {
                *bit = Bit::Zero;
                *timing = measured;
                read.timeouts += 1;
            }
            Err(BitError::Line(e)) => return Err(e),
        }
    }

    Ok(read)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::emulation::{ScriptedLine, SensorTiming, SimClock, Waveform};
    use crate::line::Mode;

    const US: Duration = Duration::from_micros(1);
    const THRESHOLD: Duration = Duration::from_micros(48);

    #[test]
    fn test_classify() {
        assert_eq!(classify(20 * US, THRESHOLD), Bit::Zero);
        assert_eq!(classify(75 * US, THRESHOLD), Bit::One);
        // The threshold itself decodes as a one.
        assert_eq!(classify(THRESHOLD, THRESHOLD), Bit::One);
        assert_eq!(classify(THRESHOLD - Duration::from_nanos(1), THRESHOLD), Bit::Zero);
    }

    fn released_line<'c>(clock: &'c SimClock, waveform: Waveform) -> ScriptedLine<'c> {
        let mut line = ScriptedLine::new(clock, waveform).idle(PinState::Low);
        line.set_mode(Mode::Input).unwrap();
        line
    }

    #[test]
    fn test_read_bit_zero_and_one() {
        let clock = SimClock::new();
        let timing = SensorTiming::default();
        let waveform = Waveform::new()
            .bit(false, &timing)
            .bit(true, &timing)
            .then(PinState::Low, 50 * US);
        let mut line = released_line(&clock, waveform);
        let config = DecoderConfig::default();

        let (bit, measured) = read_bit(&mut line, &clock, &config).unwrap();
        assert_eq!(bit, Bit::Zero);
        assert_eq!(measured.width, timing.zero);
        assert!(!measured.timed_out);

        let (bit, measured) = read_bit(&mut line, &clock, &config).unwrap();
        assert_eq!(bit, Bit::One);
        assert_eq!(measured.width, timing.one);
    }

    #[test]
    fn test_read_bit_stuck_high_times_out() {
        let clock = SimClock::new();
        let waveform = Waveform::new().then(PinState::Low, 50 * US);
        let mut line = ScriptedLine::new(&clock, waveform);
        line.set_mode(Mode::Input).unwrap();
        let config = DecoderConfig::default();

        let result = read_bit(&mut line, &clock, &config);
        let Err(BitError::Timeout(measured)) = result else {
            panic!("expected a timeout, got {result:?}");
        };
        assert!(measured.timed_out);
        assert!(measured.width > config.bit_timeout);
    }

    #[test]
    fn test_read_bit_stuck_low_times_out() {
        let clock = SimClock::new();
        let mut line = released_line(&clock, Waveform::new());
        let config = DecoderConfig::default();

        let result = read_bit(&mut line, &clock, &config);
        assert!(matches!(result, Err(BitError::Timeout(t)) if t.gap > config.bit_timeout));
    }

    #[test]
    fn test_read_byte() {
        let clock = SimClock::new();
        let timing = SensorTiming::default();
        let waveform = Waveform::new()
            .byte(0xA5, &timing)
            .then(PinState::Low, 50 * US);
        let mut line = released_line(&clock, waveform);
        let mut timings = [BitTiming::default(); BITS_PER_BYTE];

        let read = read_byte(&mut line, &clock, &DecoderConfig::default(), &mut timings).unwrap();

        assert_eq!(read.field.value(), 0xA5);
        assert_eq!(read.timeouts, 0);
        assert_eq!(timings[0].width, timing.one);
        assert_eq!(timings[1].width, timing.zero);
    }

    #[test]
    fn test_read_byte_pads_timed_out_bits_with_zero() {
        let clock = SimClock::new();
        let timing = SensorTiming::default();
        // Three ones, then the sensor leaves the line high.
        let waveform = Waveform::new()
            .bit(true, &timing)
            .bit(true, &timing)
            .bit(true, &timing)
            .then(PinState::Low, 50 * US);
        let mut line = ScriptedLine::new(&clock, waveform);
        line.set_mode(Mode::Input).unwrap();
        let mut timings = [BitTiming::default(); BITS_PER_BYTE];

        let read = read_byte(&mut line, &clock, &DecoderConfig::default(), &mut timings).unwrap();

        assert_eq!(read.field.value(), 0b1110_0000);
        assert_eq!(read.timeouts, 5);
        assert!(timings[3..].iter().all(|t| t.timed_out));
        assert!(timings[..3].iter().all(|t| !t.timed_out));
    }
}
