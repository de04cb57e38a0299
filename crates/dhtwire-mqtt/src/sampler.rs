//! The periodic scheduling loop.
//!
//! The sampler owns the sensor, and therefore the line, on a dedicated
//! thread: read cycles never overlap and never share the line.

use std::fmt::Debug;
use std::time::Duration;

use dhtwire::clock::Clock;
use dhtwire::diagnostics::DiagnosticsSink;
use dhtwire::line::Line;
use dhtwire::{Dht11, Reading};

use embedded_hal::delay::DelayNs;

use flume::{Receiver, RecvTimeoutError};

use tracing::{error, info, warn};

use crate::error::Result;
use crate::sink::ReadingSink;

/// Runs a read cycle every interval and forwards valid readings.
pub struct Sampler<L, C, D, S, K>
where
    L: Line,
    C: Clock,
    D: DelayNs,
    S: DiagnosticsSink,
{
    sensor: Dht11<L, C, D, S>,
    sink: K,
    interval: Duration,
}

impl<L, C, D, S, K> Sampler<L, C, D, S, K>
where
    L: Line,
    L::Error: Debug,
    C: Clock,
    D: DelayNs,
    S: DiagnosticsSink,
    K: ReadingSink,
{
    /// Creates a [`Sampler`].
    pub const fn new(sensor: Dht11<L, C, D, S>, sink: K, interval: Duration) -> Self {
        Self {
            sensor,
            sink,
            interval,
        }
    }

    /// Runs a single read cycle.
    ///
    /// A failed cycle is logged and yields `None`; there is no retry
    /// before the next scheduled cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects a valid reading.
    pub fn sample(&mut self) -> Result<Option<Reading>> {
        match self.sensor.read() {
            Ok(reading) => {
                info!(
                    "Temperature: {} °C, Humidity: {} %",
                    reading.temperature, reading.humidity
                );
                self.sink.accept(reading)?;
                Ok(Some(reading))
            }
            Err(e) => {
                warn!("Failed to read sensor data: {e}");
                Ok(None)
            }
        }
    }

    /// Samples until a shutdown message arrives or its sender is dropped,
    /// then hands the sensor back.
    ///
    /// The first cycle runs immediately.
    pub fn run(mut self, shutdown: &Receiver<()>) -> Dht11<L, C, D, S> {
        loop {
            if let Err(e) = self.sample() {
                error!("Stop sampling: {e}");
                break;
            }

            match shutdown.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.sensor
    }
}
