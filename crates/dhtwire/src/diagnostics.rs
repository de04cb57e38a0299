//! Per-cycle timings collected while decoding.
//!
//! Nothing is reported from inside the busy-waits: timings are written
//! into a fixed buffer and handed to the [`DiagnosticsSink`] once the
//! cycle is over.

use crate::decoder::BitTiming;
use crate::frame::{BITS_PER_BYTE, FRAME_BYTES, Frame};

/// Bit timings of a cycle, grouped by byte.
pub type CycleTimings = [[BitTiming; BITS_PER_BYTE]; FRAME_BYTES];

/// What a cycle looked like on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleDiagnostics {
    /// Timing of every bit, in transmission order.
    pub bits: CycleTimings,
    /// The assembled frame, before validation.
    pub frame: Frame,
}

impl CycleDiagnostics {
    /// Iterates over all 40 bit timings in transmission order.
    pub fn timings(&self) -> impl Iterator<Item = &BitTiming> {
        self.bits.iter().flatten()
    }

    /// Number of bits that timed out.
    #[must_use]
    pub fn timeouts(&self) -> usize {
        self.timings().filter(|timing| timing.timed_out).count()
    }
}

/// Receives the diagnostics of each completed cycle.
pub trait DiagnosticsSink {
    /// Called once per cycle, after the last bit has been sampled.
    fn cycle(&mut self, diagnostics: &CycleDiagnostics);
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for &mut S {
    #[inline]
    fn cycle(&mut self, diagnostics: &CycleDiagnostics) {
        (**self).cycle(diagnostics);
    }
}

/// A sink discarding all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl DiagnosticsSink for NoDiagnostics {
    #[inline]
    fn cycle(&mut self, _diagnostics: &CycleDiagnostics) {}
}
