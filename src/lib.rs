// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Backplate Bridge - connects an HVAC control backplate to a message bus.
//!
//! The bridge translates backplate frames into published events and remote
//! wire-control requests into backplate commands.
//!
//! # Features
//!
//! - **Events**: weather, battery and wire changes are published as they
//!   arrive from the backplate
//! - **Snapshots**: every new subscriber triggers one event carrying the full
//!   known state
//! - **Wire control**: batched connect/disconnect requests, one success flag
//!   per item
//! - **Periodic refresh**: telemetry is requested every 30 seconds by default
//!
//! # Transports
//!
//! - [`transport::mqtt`]: MQTT broker connection (feature `mqtt`, enabled by
//!   default)
//! - [`transport::memory`]: in-process channels
//!
//! # Quick Start
//!
//! ```no_run
//! use backplate_bridge::{Bridge, BridgeConfig};
//! use backplate_bridge::device::DeviceSession;
//! use backplate_bridge::transport::mqtt::MqttTransport;
//!
//! async fn serve(device: impl DeviceSession) -> backplate_bridge::Result<()> {
//!     let config = BridgeConfig::builder()
//!         .device_id("hallway")
//!         .broker("192.168.1.50", 1883)
//!         .build()?;
//!
//!     let (control, publisher) = MqttTransport::connect(&config).await?;
//!     let mut bridge = Bridge::new(device, control, publisher, &config);
//!
//!     // Only returns on a fatal error
//!     bridge.run().await
//! }
//! ```
//!
//! The device session is provided by the caller; see [`device::DeviceSession`].

pub mod bridge;
pub mod codec;
pub mod config;
pub mod control;
pub mod device;
pub mod error;
pub mod event;
pub mod state;
pub mod transport;
pub mod types;

pub use bridge::Bridge;
pub use config::{BridgeConfig, BridgeConfigBuilder, MqttConfig, Topics};
pub use control::{ControlReply, ControlRequest, WireRequest};
pub use device::{DeviceCommands, DeviceListener, DeviceMessage, DeviceSession};
pub use error::{CodecError, ConfigError, DeviceError, Error, Result, TransportError, ValueError};
pub use event::OutboundEvent;
pub use state::DeviceState;
pub use types::{Battery, PowerStatus, WeatherReading, WireChange, WireId, WireMask};
