use dhtwire::Reading;

use flume::TrySendError;

use tracing::warn;

use crate::error::{Error, ErrorKind, Result};

/// Receives every valid reading.
///
/// Failed cycles never reach the sink.
pub trait ReadingSink {
    /// Hands over a validated reading.
    ///
    /// Implementations must not block the sampling loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink can no longer accept readings.
    fn accept(&mut self, reading: Reading) -> Result<()>;
}

// A full channel means the publisher is stalled: the reading is dropped
// and the next cycle tries again.
impl ReadingSink for flume::Sender<Reading> {
    fn accept(&mut self, reading: Reading) -> Result<()> {
        match self.try_send(reading) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(reading)) => {
                warn!(
                    "Publisher is falling behind, dropping reading: {} °C, {} %",
                    reading.temperature, reading.humidity
                );
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(Error::new(
                ErrorKind::Sampler,
                "The publisher is no longer running.",
            )),
        }
    }
}
