// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration.
//!
//! Configuration can be built in code with [`BridgeConfig::builder`] or read
//! from a JSON document. Every field has a default, so an empty document is a
//! valid configuration.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use backplate_bridge::BridgeConfig;
//!
//! let config = BridgeConfig::from_json_str(r#"{
//!     "device_id": "hallway",
//!     "refresh_interval_secs": 10,
//!     "mqtt": { "host": "broker.local" }
//! }"#).unwrap();
//!
//! assert_eq!(config.refresh_interval(), Duration::from_secs(10));
//! assert_eq!(config.topics().events, "fabd/hallway/events");
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default interval between periodic telemetry requests.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker host name or address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Optional broker username.
    pub username: Option<String>,
    /// Optional broker password.
    pub password: Option<String>,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u64,
    /// Client identifier; generated when absent.
    pub client_id: Option<String>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            username: None,
            password: None,
            keep_alive_secs: 30,
            client_id: None,
        }
    }
}

impl MqttConfig {
    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// Returns the credentials if both username and password are set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => Some((u.as_str(), p.as_str())),
            _ => None,
        }
    }
}

/// Bus topics used by one bridge instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    /// Control requests arrive here.
    pub control: String,
    /// Control replies are published here.
    pub control_reply: String,
    /// Events are published here.
    pub events: String,
    /// Subscription notices arrive here.
    pub subscriptions: String,
}

/// Configuration for a bridge instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    device_id: String,
    device_path: String,
    refresh_interval_secs: u64,
    topic_prefix: String,
    mqtt: MqttConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_id: "nbp".to_string(),
            device_path: "/dev/ttyO2".to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            topic_prefix: "fabd".to_string(),
            mqtt: MqttConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Creates a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the document is malformed or holds an
    /// unusable value.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loaded bridge configuration");
        Self::from_json_str(&contents)
    }

    /// Checks that every field holds a usable value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_id.is_empty() {
            return Err(ConfigError::Invalid {
                field: "device_id",
                message: "must not be empty".to_string(),
            });
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "refresh_interval_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.mqtt.host.is_empty() {
            return Err(ConfigError::Invalid {
                field: "mqtt.host",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the device identifier used in topic names.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the path of the backplate link.
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Returns the interval between periodic telemetry requests.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Returns the broker settings.
    #[must_use]
    pub fn mqtt(&self) -> &MqttConfig {
        &self.mqtt
    }

    /// Returns the bus topics for this device.
    #[must_use]
    pub fn topics(&self) -> Topics {
        let base = format!("{}/{}", self.topic_prefix, self.device_id);
        Topics {
            control: format!("{base}/control"),
            control_reply: format!("{base}/control/reply"),
            events: format!("{base}/events"),
            subscriptions: format!("{base}/events/subscription"),
        }
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Debug, Default)]
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    /// Sets the device identifier.
    #[must_use]
    pub fn device_id(mut self, id: impl Into<String>) -> Self {
        self.config.device_id = id.into();
        self
    }

    /// Sets the backplate link path.
    #[must_use]
    pub fn device_path(mut self, path: impl Into<String>) -> Self {
        self.config.device_path = path.into();
        self
    }

    /// Sets the periodic refresh interval, rounded down to whole seconds.
    #[must_use]
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.config.refresh_interval_secs = interval.as_secs();
        self
    }

    /// Sets the topic prefix.
    #[must_use]
    pub fn topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.topic_prefix = prefix.into();
        self
    }

    /// Sets the broker host and port.
    #[must_use]
    pub fn broker(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.mqtt.host = host.into();
        self.config.mqtt.port = port;
        self
    }

    /// Sets broker credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.mqtt.username = Some(username.into());
        self.config.mqtt.password = Some(password.into());
        self
    }

    /// Sets the broker keep-alive interval.
    #[must_use]
    pub fn keep_alive(mut self, keep_alive: Duration) -> Self {
        self.config.mqtt.keep_alive_secs = keep_alive.as_secs();
        self
    }

    /// Sets a fixed MQTT client identifier.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.config.mqtt.client_id = Some(id.into());
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a field holds an unusable value.
    pub fn build(self) -> Result<BridgeConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
