use std::time::Duration;

use dhtwire::Reading;

use rumqttc::v5::{
    AsyncClient, Event, EventLoop, MqttOptions, mqttbytes::QoS, mqttbytes::v5::Packet,
};

use tokio::task::JoinHandle;

use tokio_util::sync::CancellationToken;

use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::settings::{Settings, TopicSettings};

// The capacity of the bounded asynchronous channel.
const ASYNC_CHANNEL_CAPACITY: usize = 10;

// Keep alive time to send `pingreq` to broker when the connection is idle.
const KEEP_ALIVE_TIME: Duration = Duration::from_secs(20);

// Pause before polling again after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Formats a value the way readings are published: six decimal digits.
fn payload(value: f32) -> String {
    format!("{value:.6}")
}

/// Pairs each value of a reading with its topic.
fn messages(topics: &TopicSettings, reading: Reading) -> [(&str, String); 2] {
    [
        (topics.temperature.as_str(), payload(reading.temperature)),
        (topics.humidity.as_str(), payload(reading.humidity)),
    ]
}

async fn run_event_loop(mut eventloop: EventLoop, cancellation_token: CancellationToken) {
    loop {
        tokio::select! {
            // Use the cancellation token to stop the loop
            () = cancellation_token.cancelled() => { break; }
            // Drive the `MQTT` connection
            event = eventloop.poll() => {
                match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("Connected to the MQTT broker");
                    }
                    Ok(Event::Incoming(packet)) => debug!("Incoming packet: {packet:?}"),
                    Ok(Event::Outgoing(_)) => {}
                    Err(e) => {
                        warn!("MQTT connection lost: {e}");
                        tokio::select! {
                            () = cancellation_token.cancelled() => { break; }
                            () = tokio::time::sleep(RECONNECT_DELAY) => {}
                        }
                    }
                }
            }
        }
    }
    drop(eventloop);
}

/// Publishes readings on the message bus.
pub struct Publisher {
    client: AsyncClient,
    topics: TopicSettings,
    qos: QoS,
    cancellation_token: CancellationToken,
    eventloop: JoinHandle<()>,
}

impl Publisher {
    /// Creates the `MQTT` client and starts driving its connection in a
    /// background task.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker address or the quality of service
    /// are invalid.
    pub fn connect(settings: &Settings) -> Result<Self> {
        let (host, port) = settings.mqtt.host_port()?;
        let qos = settings.qos()?;

        let mut mqttoptions = MqttOptions::new(settings.mqtt.client_id.as_str(), host, port);
        mqttoptions
            .set_keep_alive(KEEP_ALIVE_TIME)
            .set_clean_start(true);
        if !settings.mqtt.username.is_empty() {
            mqttoptions.set_credentials(
                settings.mqtt.username.as_str(),
                settings.mqtt.password.as_str(),
            );
        }

        info!("Connecting to the MQTT broker at {}", settings.mqtt.address);

        let (client, eventloop) = AsyncClient::new(mqttoptions, ASYNC_CHANNEL_CAPACITY);
        let cancellation_token = CancellationToken::new();
        let eventloop = tokio::spawn(run_event_loop(eventloop, cancellation_token.clone()));

        Ok(Self {
            client,
            topics: settings.topic.clone(),
            qos,
            cancellation_token,
            eventloop,
        })
    }

    /// Publishes the temperature and the humidity on their topics.
    ///
    /// # Errors
    ///
    /// Returns an error if the client can no longer queue messages.
    pub async fn publish(&self, reading: Reading) -> Result<()> {
        for (topic, payload) in messages(&self.topics, reading) {
            self.client.publish(topic, self.qos, false, payload).await?;
        }
        Ok(())
    }

    /// Publishes every reading received on the channel, until all its
    /// senders are dropped, then disconnects.
    pub async fn run(self, readings: flume::Receiver<Reading>) {
        while let Ok(reading) = readings.recv_async().await {
            // Publish failures are not retried, the next reading is.
            if let Err(e) = self.publish(reading).await {
                error!("Failed to publish the reading: {e}");
            }
        }
        self.disconnect().await;
    }

    async fn disconnect(self) {
        if let Err(e) = self.client.disconnect().await {
            warn!("Failed to disconnect from the MQTT broker: {e}");
        }
        self.cancellation_token.cancel();
        if let Err(e) = self.eventloop.await {
            error!("The MQTT event loop task failed: {e}");
        }
    }
}
