// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the backplate bridge.
//!
//! The bridge distinguishes fatal setup failures from transient errors that
//! only cost one loop iteration. [`Error::is_fatal`] is the single place that
//! decides which is which.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error reported by the device session.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Error reported by the control or publish channel.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error while encoding or decoding a bus message.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A setup step failed; the bridge cannot run in an unconfirmed state.
    #[error("setup failed while trying to {stage}: {source}")]
    Setup {
        /// The step that failed.
        stage: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps an error as a fatal setup failure.
    pub fn setup(stage: &'static str, source: impl Into<Error>) -> Self {
        Self::Setup {
            stage,
            source: Box::new(source.into()),
        }
    }

    /// Returns `true` if the bridge loop must stop on this error.
    ///
    /// Setup failures and closed channels are fatal. Everything else is
    /// treated as "nothing to do this cycle".
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Setup { .. } => true,
            Self::Device(DeviceError::Disconnected) => true,
            Self::Transport(TransportError::ChannelClosed(_)) => true,
            _ => false,
        }
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },
}

/// Errors reported by a device session.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// I/O on the device link failed.
    #[error("device I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The device link rejected an outbound message.
    #[error("failed to send {message}: {reason}")]
    SendFailed {
        /// The message that could not be sent.
        message: String,
        /// Why the link rejected it.
        reason: String,
    },

    /// The device link is gone.
    #[error("device link disconnected")]
    Disconnected,
}

/// Errors related to the control and publish channels.
#[derive(Debug, Error)]
pub enum TransportError {
    /// MQTT client request failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Invalid broker address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The channel has no more producers.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// The channel is full and the message was not queued.
    #[error("channel full: {0}")]
    ChannelFull(String),
}

/// Errors related to bus message serialization.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to loading and validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// A field holds an unusable value.
    #[error("invalid {field}: {message}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
