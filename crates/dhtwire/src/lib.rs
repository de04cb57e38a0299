//! `dhtwire` is a library crate that decodes the single-wire protocol of
//! the `DHT11` humidity and temperature sensor.
//!
//! The decoder drives the data line through the start handshake, measures
//! the width of each high pulse to recover 40 bits, assembles them into a
//! five-byte frame, validates the checksum and converts the result into
//! floating-point readings.
//!
//! The line is accessed through the [`line::Line`] capability, which is
//! implemented for any open-drain [`embedded-hal`] pin by
//! [`line::OpenDrainLine`]. All timeouts are wall-clock deadlines measured
//! with a [`clock::Clock`], so the decoder behaves the same regardless of
//! how fast the host polls the line.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![no_std]

#[cfg(any(test, feature = "emulation"))]
extern crate alloc;

/// Pure checksum validation.
pub mod checksum;
/// Monotonic time source and deadlines.
pub mod clock;
/// Decoder configuration.
pub mod config;
/// Conversion of raw byte pairs into floating-point values.
pub mod convert;
/// Bit classification and the per-bit and per-byte readers.
pub mod decoder;
/// Side channel for per-cycle timing diagnostics.
pub mod diagnostics;
/// Error management.
pub mod error;
/// Frame assembly from decoded bits.
pub mod frame;
/// Start-signal handshake.
pub mod handshake;
/// The GPIO line capability.
pub mod line;
/// The sensor handle driving a complete read cycle.
pub mod sensor;
/// Pulse-width measurement.
pub mod timer;

/// Scripted line and simulated clock for running the decoder without
/// hardware.
#[cfg(any(test, feature = "emulation"))]
pub mod emulation;

pub use config::DecoderConfig;
pub use error::ReadError;
pub use frame::Frame;
pub use sensor::{Dht11, Reading};
