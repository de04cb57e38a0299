use std::path::PathBuf;

use clap::Parser;

/// Samples a DHT11 sensor and publishes its readings over MQTT.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Settings file.
    #[arg(short = 'f', long = "file", default_value = "./config.json")]
    pub file: PathBuf,

    /// Logs debug messages, including the timing of every bit.
    #[arg(short, long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dhtwire-mqtt"]).unwrap();

        assert_eq!(cli.file, PathBuf::from("./config.json"));
        assert!(!cli.debug);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["dhtwire-mqtt", "-f", "/etc/dht11.json", "-d"]).unwrap();

        assert_eq!(cli.file, PathBuf::from("/etc/dht11.json"));
        assert!(cli.debug);
    }
}
