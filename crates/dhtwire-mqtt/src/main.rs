//! `dhtwire-mqtt` samples a `DHT11` sensor wired to a Raspberry Pi GPIO
//! line and publishes its temperature and humidity readings over `MQTT`.
//!
//! The sensor is read on a dedicated thread at a fixed interval. Valid
//! readings are forwarded to the publisher task; failed cycles are logged
//! and skipped until the next interval.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cli;
mod diagnostics;
mod error;
mod gpio;
mod publisher;
mod sampler;
mod settings;
mod sink;

use clap::Parser;

use dhtwire::Dht11;

use rppal::hal::Delay;

use tracing::{Level, error, info};

use crate::cli::Cli;
use crate::diagnostics::TracingDiagnostics;
use crate::error::{Error, ErrorKind, Result};
use crate::gpio::{GpioLine, StdClock};
use crate::publisher::Publisher;
use crate::sampler::Sampler;
use crate::settings::Settings;

// Readings waiting to be published.
const READINGS_CAPACITY: usize = 4;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .init();

    let settings = Settings::load(&cli.file).inspect_err(|e| error!("{e}"))?;

    // Without the line no cycle can ever succeed.
    let line = GpioLine::acquire(settings.pin).inspect_err(|e| error!("{e}"))?;

    let sensor = Dht11::new(
        line,
        StdClock::new(),
        Delay::new(),
        settings.decoder_config(cli.debug),
    )
    .with_diagnostics(TracingDiagnostics);

    let publisher = Publisher::connect(&settings)?;

    let (readings_tx, readings_rx) = flume::bounded(READINGS_CAPACITY);
    let (shutdown_tx, shutdown_rx) = flume::bounded(1);

    let interval = settings.interval();
    let mut sampler = tokio::task::spawn_blocking(move || {
        Sampler::new(sensor, readings_tx, interval)
            .run(&shutdown_rx)
            .release()
    });

    let publisher = tokio::spawn(publisher.run(readings_rx));

    let finished = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Cannot listen for the shutdown signal: {e}");
            }
            None
        }
        line = &mut sampler => Some(line),
    };

    let line = match finished {
        Some(line) => line,
        None => {
            info!("Shutting down");
            // The sampler may already be gone.
            let _ = shutdown_tx.send(());
            sampler.await
        }
    }
    .map_err(|e| Error::new(ErrorKind::Sampler, e.to_string()))?;

    line.release();

    if let Err(e) = publisher.await {
        error!("The publisher task failed: {e}");
    }

    Ok(())
}
