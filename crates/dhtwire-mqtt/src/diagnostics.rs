use dhtwire::diagnostics::{CycleDiagnostics, DiagnosticsSink};

use tracing::debug;

/// Logs the timings of each cycle at debug level.
///
/// Runs after the cycle is over, so logging never delays a measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn cycle(&mut self, diagnostics: &CycleDiagnostics) {
        for (bit, timing) in diagnostics.timings().enumerate() {
            debug!(
                bit,
                wait = ?timing.gap,
                width = ?timing.width,
                timed_out = timing.timed_out,
                "Bit timing"
            );
        }

        let frame = diagnostics.frame;
        debug!(
            humidity_int = frame.humidity_int,
            humidity_frac = frame.humidity_frac,
            temperature_int = frame.temperature_int,
            temperature_frac = frame.temperature_frac,
            checksum = frame.checksum,
            timeouts = diagnostics.timeouts(),
            "Raw frame"
        );
    }
}
