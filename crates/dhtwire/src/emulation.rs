//! A scripted stand-in for the sensor and the host timer.
//!
//! [`SimClock`] is a clock that only moves when told to: every sample of a
//! [`ScriptedLine`] costs a fixed amount of simulated time, and delays
//! advance it by the requested amount. The line plays a [`Waveform`] from
//! the instant the host releases it, so a whole read cycle runs
//! deterministically and instantly.

use alloc::vec::Vec;
use core::cell::Cell;
use core::convert::Infallible;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::clock::Clock;
use crate::line::{Line, Mode};

const DEFAULT_READ_COST: Duration = Duration::from_micros(1);

#[inline]
fn nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// A manually advanced monotonic clock.
///
/// Used as a delay provider it advances by the requested delay instead of
/// sleeping.
#[derive(Debug, Default)]
pub struct SimClock {
    now: Cell<u64>,
}

impl SimClock {
    /// Creates a [`SimClock`] at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get().saturating_add(nanos(duration)));
    }
}

impl Clock for SimClock {
    #[inline]
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now.get())
    }
}

impl DelayNs for &SimClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(Duration::from_nanos(u64::from(ns)));
    }
}

/// Pulse widths produced by the emulated sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorTiming {
    /// Pull-up time between the host release and the sensor answer.
    pub response_delay: Duration,
    /// Acknowledgement low pulse.
    pub ack_low: Duration,
    /// Acknowledgement high pulse.
    pub ack_high: Duration,
    /// Low gap preceding every bit.
    pub gap: Duration,
    /// High pulse of a zero bit.
    pub zero: Duration,
    /// High pulse of a one bit.
    pub one: Duration,
    /// Low pulse closing the transmission.
    pub trailer: Duration,
}

impl Default for SensorTiming {
    fn default() -> Self {
        Self {
            response_delay: Duration::from_micros(20),
            ack_low: Duration::from_micros(80),
            ack_high: Duration::from_micros(80),
            gap: Duration::from_micros(50),
            zero: Duration::from_micros(26),
            one: Duration::from_micros(70),
            trailer: Duration::from_micros(50),
        }
    }
}

/// A sequence of levels, each held for a duration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Waveform {
    segments: Vec<(PinState, Duration)>,
}

impl Waveform {
    /// Creates an empty [`Waveform`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Appends a level held for the given duration.
    #[must_use]
    pub fn then(mut self, level: PinState, duration: Duration) -> Self {
        self.segments.push((level, duration));
        self
    }

    /// The sensor acknowledgement, up to the first bit gap.
    #[must_use]
    pub fn handshake(timing: &SensorTiming) -> Self {
        Self::new()
            .then(PinState::High, timing.response_delay)
            .then(PinState::Low, timing.ack_low)
            .then(PinState::High, timing.ack_high)
    }

    /// Appends the gap and high pulse of one bit.
    #[must_use]
    pub fn bit(self, one: bool, timing: &SensorTiming) -> Self {
        let width = if one { timing.one } else { timing.zero };
        self.then(PinState::Low, timing.gap)
            .then(PinState::High, width)
    }

    /// Appends eight bits, most significant first.
    #[must_use]
    pub fn byte(self, value: u8, timing: &SensorTiming) -> Self {
        (0..8).fold(self, |waveform, i| {
            waveform.bit(value & (0x80 >> i) != 0, timing)
        })
    }

    /// A complete sensor answer transmitting the given five bytes.
    #[must_use]
    pub fn dht11(bytes: [u8; 5]) -> Self {
        Self::dht11_with(bytes, &SensorTiming::default())
    }

    /// A complete sensor answer with custom pulse widths.
    #[must_use]
    pub fn dht11_with(bytes: [u8; 5], timing: &SensorTiming) -> Self {
        bytes
            .iter()
            .fold(Self::handshake(timing), |waveform, &byte| {
                waveform.byte(byte, timing)
            })
            .then(PinState::Low, timing.trailer)
    }

    /// The level at the given offset from the start, if still playing.
    #[must_use]
    pub fn level_at(&self, offset: Duration) -> Option<PinState> {
        let mut end = Duration::ZERO;
        for &(level, duration) in &self.segments {
            end += duration;
            if offset < end {
                return Some(level);
            }
        }
        None
    }

    /// Total duration of the waveform.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.segments.iter().map(|&(_, duration)| duration).sum()
    }
}

/// A host action recorded by a [`ScriptedLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    /// The direction changed.
    Mode(Mode),
    /// A level was driven.
    Write(PinState),
}

/// A host action along with the simulated time it happened at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEvent {
    /// Simulated time of the action.
    pub at: Duration,
    /// The action.
    pub action: LineAction,
}

/// A [`Line`] replaying a [`Waveform`] every time the host releases it.
///
/// While in output mode the line reads back the level the host drives.
/// Once the waveform is over the line rests at its idle level, high by
/// default like a line with a pull-up resistor.
pub struct ScriptedLine<'clock> {
    clock: &'clock SimClock,
    waveform: Waveform,
    idle: PinState,
    read_cost: Duration,
    mode: Mode,
    driven: PinState,
    released_at: Duration,
    events: Vec<LineEvent>,
}

impl<'clock> ScriptedLine<'clock> {
    /// Creates a [`ScriptedLine`] playing `waveform` on the given clock.
    #[must_use]
    pub fn new(clock: &'clock SimClock, waveform: Waveform) -> Self {
        Self {
            clock,
            waveform,
            idle: PinState::High,
            read_cost: DEFAULT_READ_COST,
            mode: Mode::Output,
            driven: PinState::High,
            released_at: Duration::ZERO,
            events: Vec::new(),
        }
    }

    /// Sets the level the line rests at after the waveform ends.
    #[must_use]
    pub fn idle(mut self, level: PinState) -> Self {
        self.idle = level;
        self
    }

    /// Sets the simulated time consumed by each sample.
    #[must_use]
    pub fn read_cost(mut self, cost: Duration) -> Self {
        self.read_cost = cost;
        self
    }

    /// Host actions recorded so far.
    #[must_use]
    pub fn events(&self) -> &[LineEvent] {
        &self.events
    }

    /// Number of times the host released the line.
    #[must_use]
    pub fn releases(&self) -> usize {
        self.events
            .iter()
            .filter(|event| event.action == LineAction::Mode(Mode::Input))
            .count()
    }

    fn record(&mut self, action: LineAction) {
        self.events.push(LineEvent {
            at: self.clock.now(),
            action,
        });
    }

    fn level(&self) -> PinState {
        match self.mode {
            Mode::Output => self.driven,
            Mode::Input => {
                let offset = self.clock.now().saturating_sub(self.released_at);
                self.waveform.level_at(offset).unwrap_or(self.idle)
            }
        }
    }
}

impl Line for ScriptedLine<'_> {
    type Error = Infallible;

    fn set_mode(&mut self, mode: Mode) -> Result<(), Self::Error> {
        if mode == Mode::Input {
            self.released_at = self.clock.now();
        }
        self.mode = mode;
        self.record(LineAction::Mode(mode));
        Ok(())
    }

    fn write(&mut self, level: PinState) -> Result<(), Self::Error> {
        self.driven = level;
        self.record(LineAction::Write(level));
        Ok(())
    }

    fn read(&mut self) -> Result<PinState, Self::Error> {
        let level = self.level();
        self.clock.advance(self.read_cost);
        Ok(level)
    }
}
