use crate::handshake::Phase;

/// Errors that may occur during a read cycle.
///
/// Every variant means the cycle produced no reading. None of them is
/// fatal: the next cycle starts again from the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError<E> {
    /// GPIO line errors.
    Line(E),
    /// The sensor did not answer the start signal in time.
    HandshakeTimeout(Phase),
    /// Some bits exceeded their deadline and were recorded as zeros.
    BitTimeout {
        /// Number of timed-out bits.
        bits: u8,
    },
    /// The transmitted checksum does not match the frame data.
    ChecksumMismatch {
        /// Checksum computed from the data bytes.
        expected: u8,
        /// Checksum sent by the sensor.
        received: u8,
    },
}

impl<E> From<E> for ReadError<E> {
    fn from(e: E) -> Self {
        ReadError::Line(e)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for ReadError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Line(e) => write!(f, "GPIO line error: {e:?}"),
            Self::HandshakeTimeout(phase) => {
                write!(f, "sensor did not answer during the {phase} phase")
            }
            Self::BitTimeout { bits } => write!(f, "{bits} bit(s) timed out"),
            Self::ChecksumMismatch { expected, received } => write!(
                f,
                "checksum mismatch: expected {expected:#04x}, received {received:#04x}"
            ),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for ReadError<E> {}
