//! The start handshake.
//!
//! The host pulls the line low for at least 18 ms, drives it high briefly
//! and releases it. The sensor answers with a low pulse followed by a high
//! pulse, after which the first data bit begins.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::clock::Clock;
use crate::config::DecoderConfig;
use crate::error::ReadError;
use crate::line::{Line, Mode};
use crate::timer::{WaitError, wait_while};

/// The wait phase of the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The released line is pulled up until the sensor answers.
    Settle,
    /// The sensor acknowledgement low pulse.
    AckLow,
    /// The sensor acknowledgement high pulse.
    AckHigh,
}

impl Phase {
    const fn level(self) -> PinState {
        match self {
            Self::Settle | Self::AckHigh => PinState::High,
            Self::AckLow => PinState::Low,
        }
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Settle => "settle",
            Self::AckLow => "acknowledgement low",
            Self::AckHigh => "acknowledgement high",
        })
    }
}

/// The sensor acknowledged the start signal and is about to transmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    /// Time between the release and the sensor answer.
    pub settle: Duration,
    /// Width of the acknowledgement low pulse.
    pub ack_low: Duration,
    /// Width of the acknowledgement high pulse.
    pub ack_high: Duration,
}

#[inline]
fn micros(duration: Duration) -> u32 {
    u32::try_from(duration.as_micros()).unwrap_or(u32::MAX)
}

/// Sends the start signal and waits for the sensor acknowledgement.
///
/// Every wait phase is bounded by [`DecoderConfig::handshake_timeout`].
///
/// # Errors
///
/// Returns [`ReadError::HandshakeTimeout`] with the phase that stalled, or
/// the line error if driving or sampling fails.
pub fn perform_handshake<L, C, D>(
    line: &mut L,
    clock: &C,
    delay: &mut D,
    config: &DecoderConfig,
) -> Result<Ready, ReadError<L::Error>>
where
    L: Line + ?Sized,
    C: Clock + ?Sized,
    D: DelayNs + ?Sized,
{
    // Pull the line low long enough for the sensor to detect the request.
    line.set_mode(Mode::Output)?;
    line.write(PinState::Low)?;
    delay.delay_us(micros(config.start_low));

    // Drive it high briefly, then hand it over to the sensor.
    line.write(PinState::High)?;
    delay.delay_us(micros(config.start_high));
    line.set_mode(Mode::Input)?;

    let mut wait = |phase: Phase| {
        wait_while(&mut *line, clock, phase.level(), config.handshake_timeout)
            .map(|pulse| pulse.elapsed)
            .map_err(|e| match e {
                WaitError::Line(e) => ReadError::Line(e),
                WaitError::Timeout(_) => ReadError::HandshakeTimeout(phase),
            })
    };

    Ok(Ready {
        settle: wait(Phase::Settle)?,
        ack_low: wait(Phase::AckLow)?,
        ack_high: wait(Phase::AckHigh)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::vec::Vec;

    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    use crate::emulation::{LineAction, ScriptedLine, SensorTiming, SimClock, Waveform};
    use crate::line::OpenDrainLine;

    const US: Duration = Duration::from_micros(1);

    #[test]
    fn test_handshake_success() {
        let clock = SimClock::new();
        let timing = SensorTiming::default();
        let mut line = ScriptedLine::new(&clock, Waveform::handshake(&timing))
            .idle(PinState::Low);
        let mut delay = &clock;

        let ready =
            perform_handshake(&mut line, &clock, &mut delay, &DecoderConfig::default()).unwrap();

        // Timed from the release, including the sample that sees the edge.
        assert_eq!(ready.settle, timing.response_delay + US);
        assert_eq!(ready.ack_low, timing.ack_low);
        assert_eq!(ready.ack_high, timing.ack_high);
    }

    #[test]
    fn test_start_signal_holds_low() {
        let clock = SimClock::new();
        let mut line = ScriptedLine::new(&clock, Waveform::handshake(&SensorTiming::default()))
            .idle(PinState::Low);
        let mut delay = &clock;

        perform_handshake(&mut line, &clock, &mut delay, &DecoderConfig::default()).unwrap();

        let actions: Vec<_> = line.events().iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            [
                LineAction::Mode(Mode::Output),
                LineAction::Write(PinState::Low),
                LineAction::Write(PinState::High),
                LineAction::Mode(Mode::Input),
            ]
        );

        let low_hold = line.events()[2].at - line.events()[1].at;
        assert!(low_hold >= Duration::from_millis(18));
    }

    #[test]
    fn test_handshake_open_drain_sequence() {
        // The sensor answers on the very first sample of each phase.
        let expectations = [
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
            PinTransaction::set(State::High),
            PinTransaction::get(State::Low),
            PinTransaction::get(State::High),
            PinTransaction::get(State::Low),
        ];

        let clock = SimClock::new();
        let mut line = OpenDrainLine::new(PinMock::new(&expectations));
        let mut delay = NoopDelay::new();

        perform_handshake(&mut line, &clock, &mut delay, &DecoderConfig::default()).unwrap();

        line.into_inner().done();
    }

    #[test]
    fn test_handshake_no_answer() {
        let clock = SimClock::new();
        // Nothing is connected: the pull-up keeps the line high.
        let mut line = ScriptedLine::new(&clock, Waveform::new());
        let mut delay = &clock;

        let result = perform_handshake(&mut line, &clock, &mut delay, &DecoderConfig::default());

        assert!(matches!(result, Err(ReadError::HandshakeTimeout(Phase::Settle))));
    }

    #[test]
    fn test_handshake_stuck_low() {
        let clock = SimClock::new();
        let waveform = Waveform::new().then(PinState::High, 20 * US);
        let mut line = ScriptedLine::new(&clock, waveform).idle(PinState::Low);
        let mut delay = &clock;

        let result = perform_handshake(&mut line, &clock, &mut delay, &DecoderConfig::default());

        assert!(matches!(result, Err(ReadError::HandshakeTimeout(Phase::AckLow))));
    }

    #[test]
    fn test_handshake_stuck_high_after_ack() {
        let clock = SimClock::new();
        let waveform = Waveform::new()
            .then(PinState::High, 20 * US)
            .then(PinState::Low, 80 * US);
        let mut line = ScriptedLine::new(&clock, waveform);
        let mut delay = &clock;
        let config = DecoderConfig::default().handshake_timeout(Duration::from_micros(200));

        let result = perform_handshake(&mut line, &clock, &mut delay, &config);

        assert!(matches!(result, Err(ReadError::HandshakeTimeout(Phase::AckHigh))));
    }
}
