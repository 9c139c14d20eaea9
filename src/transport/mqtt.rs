// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT implementation of the bridge channels.
//!
//! Both channels share one broker connection. Topic layout (see
//! [`Topics`](crate::config::Topics)):
//!
//! - `<prefix>/<device>/control` - control requests in
//! - `<prefix>/<device>/control/reply` - control replies out
//! - `<prefix>/<device>/events` - events out
//! - `<prefix>/<device>/events/subscription` - subscription notices in
//!
//! A client announces itself by publishing a single `0x01` byte to the
//! subscription topic after subscribing to the events topic, and `0x00` when
//! it leaves. The bridge only listens for notices once the publisher is bound.
//!
//! # Examples
//!
//! ```no_run
//! use backplate_bridge::BridgeConfig;
//! use backplate_bridge::transport::mqtt::MqttTransport;
//!
//! # async fn example() -> backplate_bridge::Result<()> {
//! let config = BridgeConfig::builder().broker("192.168.1.50", 1883).build()?;
//! let (control, publisher) = MqttTransport::connect(&config).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::mpsc;

use crate::config::{BridgeConfig, Topics};
use crate::error::TransportError;
use crate::transport::{ControlChannel, EventPublisher, Inbox};

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Capacity of the client request queue and of each inbound queue.
const QUEUE_CAPACITY: usize = 16;

/// Entry point for building MQTT channels.
#[derive(Debug)]
pub struct MqttTransport;

impl MqttTransport {
    /// Connects to the configured broker and returns both channels.
    ///
    /// The control topic is subscribed immediately. The subscription topic is
    /// subscribed when the publisher is bound.
    ///
    /// Must be called from within a tokio runtime; the connection is driven
    /// by a background task.
    ///
    /// # Errors
    ///
    /// Returns error if the broker address is unusable or the control
    /// subscription cannot be queued.
    pub async fn connect(
        config: &BridgeConfig,
    ) -> Result<(MqttControlChannel, MqttEventPublisher), TransportError> {
        let mqtt = config.mqtt();
        if mqtt.host.is_empty() {
            return Err(TransportError::InvalidAddress("broker host is required".to_string()));
        }

        // Generate or use provided client ID (PID + counter to avoid conflicts)
        let client_id = mqtt.client_id.clone().unwrap_or_else(|| {
            let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            format!("backplate_{}_{}", std::process::id(), counter)
        });

        let mut options = MqttOptions::new(&client_id, mqtt.host.as_str(), mqtt.port);
        options.set_keep_alive(mqtt.keep_alive());
        options.set_clean_session(true);
        if let Some((username, password)) = mqtt.credentials() {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, QUEUE_CAPACITY);
        let topics = config.topics();

        client
            .subscribe(topics.control.as_str(), QoS::AtLeastOnce)
            .await
            .map_err(TransportError::Mqtt)?;

        let (control_tx, control_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (notice_tx, notice_rx) = mpsc::channel(QUEUE_CAPACITY);

        tracing::info!(
            host = %mqtt.host,
            port = mqtt.port,
            client_id = %client_id,
            control = %topics.control,
            "Connecting bridge to MQTT broker"
        );

        tokio::spawn(pump(event_loop, topics.clone(), control_tx, notice_tx));

        Ok((
            MqttControlChannel {
                client: client.clone(),
                reply_topic: topics.control_reply.clone(),
                requests: Inbox::new("control", control_rx),
            },
            MqttEventPublisher {
                client,
                topics,
                notices: Inbox::new("subscriptions", notice_rx),
                bound: false,
            },
        ))
    }
}

/// Drives the MQTT connection and routes incoming messages by topic.
///
/// Returns on the first connection error, which closes both inbound queues.
async fn pump(
    mut event_loop: EventLoop,
    topics: Topics,
    control_tx: mpsc::Sender<Vec<u8>>,
    notice_tx: mpsc::Sender<Vec<u8>>,
) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT connected");
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let target = if publish.topic == topics.control {
                    &control_tx
                } else if publish.topic == topics.subscriptions {
                    &notice_tx
                } else {
                    tracing::trace!(topic = %publish.topic, "Ignoring message on unknown topic");
                    continue;
                };
                tracing::debug!(
                    topic = %publish.topic,
                    bytes = publish.payload.len(),
                    "Received MQTT message"
                );
                if target.send(publish.payload.to_vec()).await.is_err() {
                    tracing::debug!("Bridge channel dropped, stopping MQTT pump");
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "MQTT event loop error");
                break;
            }
        }
    }
}

/// Control channel over MQTT.
pub struct MqttControlChannel {
    client: AsyncClient,
    reply_topic: String,
    requests: Inbox,
}

impl ControlChannel for MqttControlChannel {
    async fn readable(&mut self) -> Result<(), TransportError> {
        self.requests.readable().await
    }

    fn try_recv(&mut self) -> Option<Vec<u8>> {
        self.requests.try_recv()
    }

    fn send_reply(&mut self, payload: Vec<u8>) -> Result<(), TransportError> {
        self.client
            .try_publish(self.reply_topic.as_str(), QoS::AtLeastOnce, false, payload)
            .map_err(TransportError::Mqtt)
    }
}

/// Event publisher over MQTT.
pub struct MqttEventPublisher {
    client: AsyncClient,
    topics: Topics,
    notices: Inbox,
    bound: bool,
}

impl MqttEventPublisher {
    /// Returns the topic events are published on.
    #[must_use]
    pub fn events_topic(&self) -> &str {
        &self.topics.events
    }

    /// Returns `true` once the publisher has been bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound
    }
}

impl EventPublisher for MqttEventPublisher {
    fn bind(&mut self) -> Result<(), TransportError> {
        self.client
            .try_subscribe(self.topics.subscriptions.as_str(), QoS::AtLeastOnce)
            .map_err(TransportError::Mqtt)?;
        self.bound = true;
        tracing::info!(
            events = %self.topics.events,
            subscriptions = %self.topics.subscriptions,
            "Event publisher bound"
        );
        Ok(())
    }

    fn publish(&mut self, payload: Vec<u8>) -> Result<(), TransportError> {
        if !self.bound {
            tracing::trace!("Discarding event on unbound MQTT publisher");
            return Ok(());
        }
        self.client
            .try_publish(self.topics.events.as_str(), QoS::AtMostOnce, false, payload)
            .map_err(TransportError::Mqtt)
    }

    async fn readable(&mut self) -> Result<(), TransportError> {
        self.notices.readable().await
    }

    fn try_recv_notice(&mut self) -> Option<Vec<u8>> {
        self.notices.try_recv()
    }
}
