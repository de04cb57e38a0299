use std::path::Path;
use std::time::Duration;

use dhtwire::DecoderConfig;

use rumqttc::v5::mqttbytes::QoS;

use serde::Deserialize;

use crate::error::{Error, ErrorKind, Result};

const DEFAULT_CLIENT_ID: &str = "DHT11_Sensor";
const DEFAULT_PIN: u8 = 4;
const DEFAULT_QOS: u8 = 1;
const DEFAULT_INTERVAL_SECS: u64 = 60;
const DEFAULT_MQTT_PORT: u16 = 1883;

fn settings_error(info: impl Into<std::borrow::Cow<'static, str>>) -> Error {
    Error::new(ErrorKind::Settings, info)
}

/// Message bus connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MqttSettings {
    /// Broker address, as `[scheme://]host[:port]`.
    pub address: String,
    /// Client identifier announced to the broker.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Broker user name.
    #[serde(default)]
    pub username: String,
    /// Broker password.
    #[serde(default)]
    pub password: String,
}

impl MqttSettings {
    /// Splits the broker address into host and port.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is empty or the port is not a number.
    pub fn host_port(&self) -> Result<(String, u16)> {
        let address = self
            .address
            .split_once("://")
            .map_or(self.address.as_str(), |(_, rest)| rest)
            .trim_end_matches('/');

        let (host, port) = match address.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse().map_err(|_| {
                    settings_error(format!("Invalid port in broker address `{}`.", self.address))
                })?;
                (host, port)
            }
            None => (address, DEFAULT_MQTT_PORT),
        };

        if host.is_empty() {
            return Err(settings_error(format!(
                "Missing host in broker address `{}`.",
                self.address
            )));
        }

        Ok((host.to_owned(), port))
    }
}

/// Topics the readings are published on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicSettings {
    /// Temperature topic.
    pub temperature: String,
    /// Humidity topic.
    pub humidity: String,
}

/// Decoder timing overrides, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DecoderSettings {
    /// Start signal low pulse.
    pub start_low_us: Option<u64>,
    /// Start signal high pulse.
    pub start_high_us: Option<u64>,
    /// Deadline of each handshake phase.
    pub handshake_timeout_us: Option<u64>,
    /// Deadline of each bit pulse.
    pub bit_timeout_us: Option<u64>,
    /// Pulse width separating a zero from a one.
    pub bit_threshold_us: Option<u64>,
}

/// The daemon settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Message bus settings.
    pub mqtt: MqttSettings,
    /// Publishing topics.
    pub topic: TopicSettings,
    /// BCM number of the GPIO line the sensor is wired to.
    #[serde(default = "default_pin")]
    pub pin: u8,
    /// Quality of service of the published messages.
    #[serde(default = "default_qos")]
    pub qos: u8,
    /// Seconds between two read cycles.
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Decoder timing overrides.
    #[serde(default)]
    pub decoder: DecoderSettings,
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.into()
}

const fn default_pin() -> u8 {
    DEFAULT_PIN
}

const fn default_qos() -> u8 {
    DEFAULT_QOS
}

const fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

impl Settings {
    /// Loads and validates the settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid `JSON`,
    /// or contains invalid values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            settings_error(format!("Cannot read file {}: {e}", path.display()))
        })?;
        Self::parse(&contents)
    }

    /// Parses and validates settings from a `JSON` string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid `JSON` or contains
    /// invalid values.
    pub fn parse(contents: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(contents)?;
        let _ = settings.mqtt.host_port()?;
        let _ = settings.qos()?;

        if settings.interval == 0 {
            return Err(settings_error("The sampling interval must be positive."));
        }

        Ok(settings)
    }

    /// The publishing quality of service.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not 0, 1 or 2.
    pub fn qos(&self) -> Result<QoS> {
        match self.qos {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            qos => Err(settings_error(format!("Invalid QoS level `{qos}`."))),
        }
    }

    /// Time between two read cycles.
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Builds the decoder configuration, enabling diagnostics on request.
    pub fn decoder_config(&self, diagnostics: bool) -> DecoderConfig {
        let overrides = self.decoder;
        let mut config = DecoderConfig::new().diagnostics(diagnostics);

        if let Some(us) = overrides.start_low_us {
            config = config.start_low(Duration::from_micros(us));
        }
        if let Some(us) = overrides.start_high_us {
            config = config.start_high(Duration::from_micros(us));
        }
        if let Some(us) = overrides.handshake_timeout_us {
            config = config.handshake_timeout(Duration::from_micros(us));
        }
        if let Some(us) = overrides.bit_timeout_us {
            config = config.bit_timeout(Duration::from_micros(us));
        }
        if let Some(us) = overrides.bit_threshold_us {
            config = config.bit_threshold(Duration::from_micros(us));
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "mqtt": { "address": "tcp://broker.local:1884" },
        "topic": { "temperature": "home/temperature", "humidity": "home/humidity" }
    }"#;

    #[test]
    fn test_defaults() {
        let settings = Settings::parse(MINIMAL).unwrap();

        assert_eq!(settings.mqtt.client_id, "DHT11_Sensor");
        assert_eq!(settings.pin, 4);
        assert_eq!(settings.qos().unwrap(), QoS::AtLeastOnce);
        assert_eq!(settings.interval(), Duration::from_secs(60));
        assert_eq!(settings.decoder_config(false), DecoderConfig::default());
        assert_eq!(
            settings.mqtt.host_port().unwrap(),
            ("broker.local".to_owned(), 1884)
        );
    }

    #[test]
    fn test_full_settings() {
        let settings = Settings::parse(
            r#"{
                "mqtt": {
                    "address": "localhost",
                    "client_id": "greenhouse",
                    "username": "sensor",
                    "password": "secret"
                },
                "topic": { "temperature": "t", "humidity": "h" },
                "pin": 17,
                "qos": 0,
                "interval": 30,
                "decoder": { "bit_threshold_us": 40, "handshake_timeout_us": 2000 }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.pin, 17);
        assert_eq!(settings.qos().unwrap(), QoS::AtMostOnce);
        assert_eq!(settings.mqtt.host_port().unwrap(), ("localhost".to_owned(), 1883));

        let config = settings.decoder_config(true);
        assert!(config.diagnostics);
        assert_eq!(config.bit_threshold, Duration::from_micros(40));
        assert_eq!(config.handshake_timeout, Duration::from_millis(2));
        assert_eq!(config.bit_timeout, DecoderConfig::default().bit_timeout);
    }

    #[test]
    fn test_invalid_settings() {
        let missing_topic = r#"{ "mqtt": { "address": "localhost" } }"#;
        assert_eq!(
            Settings::parse(missing_topic).unwrap_err().kind(),
            ErrorKind::Settings
        );

        let bad_qos = MINIMAL.replace("\"topic\"", "\"qos\": 3, \"topic\"");
        assert!(Settings::parse(&bad_qos).is_err());

        let bad_port = MINIMAL.replace("1884", "mqtt");
        assert!(Settings::parse(&bad_port).is_err());

        let no_interval = MINIMAL.replace("\"topic\"", "\"interval\": 0, \"topic\"");
        assert!(Settings::parse(&no_interval).is_err());
    }

    #[test]
    fn test_missing_file() {
        let error = Settings::load(Path::new("/nonexistent/config.json")).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Settings);
    }
}
