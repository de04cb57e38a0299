use core::time::Duration;

// Protocol-specific timing constants.
const START_SIGNAL_LOW: Duration = Duration::from_millis(18); // Host holds the line low to request a reading.
const START_SIGNAL_HIGH: Duration = Duration::from_micros(20); // Host drives high briefly before releasing.
const HANDSHAKE_PHASE_TIMEOUT: Duration = Duration::from_millis(1); // Budget of each acknowledgement phase.
const BIT_TIMEOUT: Duration = Duration::from_micros(100); // A 1000-poll ceiling at ~10 polls per microsecond.
const BIT_THRESHOLD: Duration = Duration::from_micros(48); // Midway between a zero and a one pulse.

/// Timing parameters of the decoder.
///
/// The defaults follow the sensor datasheet: a zero bit is a high pulse of
/// about 26–28 µs, a one bit a high pulse of about 70 µs. The threshold
/// sits between the two so that sampling latency never pushes a zero over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// How long the host holds the line low to start a cycle.
    pub start_low: Duration,
    /// How long the host drives the line high before releasing it.
    pub start_high: Duration,
    /// Deadline of each of the three handshake wait phases.
    pub handshake_timeout: Duration,
    /// Deadline of both the gap and the high pulse of a single bit.
    pub bit_timeout: Duration,
    /// Pulses at least this wide are decoded as a one.
    pub bit_threshold: Duration,
    /// Whether per-cycle timings are handed to the diagnostics sink.
    pub diagnostics: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderConfig {
    /// Creates a [`DecoderConfig`] with the default timings and
    /// diagnostics disabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start_low: START_SIGNAL_LOW,
            start_high: START_SIGNAL_HIGH,
            handshake_timeout: HANDSHAKE_PHASE_TIMEOUT,
            bit_timeout: BIT_TIMEOUT,
            bit_threshold: BIT_THRESHOLD,
            diagnostics: false,
        }
    }

    /// Sets the duration of the start signal low pulse.
    #[must_use]
    pub const fn start_low(mut self, start_low: Duration) -> Self {
        self.start_low = start_low;
        self
    }

    /// Sets the duration of the start signal high pulse.
    #[must_use]
    pub const fn start_high(mut self, start_high: Duration) -> Self {
        self.start_high = start_high;
        self
    }

    /// Sets the deadline of each handshake wait phase.
    #[must_use]
    pub const fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Sets the deadline of each bit pulse.
    #[must_use]
    pub const fn bit_timeout(mut self, timeout: Duration) -> Self {
        self.bit_timeout = timeout;
        self
    }

    /// Sets the pulse width separating a zero from a one.
    #[must_use]
    pub const fn bit_threshold(mut self, threshold: Duration) -> Self {
        self.bit_threshold = threshold;
        self
    }

    /// Enables or disables diagnostics.
    #[must_use]
    pub const fn diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = DecoderConfig::default();

        assert_eq!(config.start_low, Duration::from_millis(18));
        assert_eq!(config.bit_threshold, Duration::from_micros(48));
        assert_eq!(config.bit_timeout, Duration::from_micros(100));
        assert_eq!(config.handshake_timeout, Duration::from_millis(1));
        assert!(!config.diagnostics);
    }

    #[test]
    fn test_builder_overrides() {
        let config = DecoderConfig::new()
            .bit_threshold(Duration::from_micros(40))
            .diagnostics(true);

        assert_eq!(config.bit_threshold, Duration::from_micros(40));
        assert!(config.diagnostics);
        assert_eq!(config.start_low, START_SIGNAL_LOW);
    }
}
