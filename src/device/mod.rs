// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device session interface.
//!
//! The backplate link (framing, checksums, frame parsing) lives behind the
//! [`DeviceSession`] trait. The bridge drives it and receives decoded frames
//! through a [`DeviceListener`], one method per frame kind.
//!
//! # Architecture
//!
//! ```text
//! backplate tty ──frames──▶ DeviceSession::read()
//!                                  │
//!                                  ▼
//!                 DeviceListener::on_weather / on_power_status / ...
//!                                  │
//!                                  ▼
//!                     DeviceState update + OutboundEvent
//! ```

use std::fmt;

use crate::error::{DeviceError, Result};
use crate::types::{PowerStatus, WeatherReading, WireId, WireMask};

/// Payload-less protocol messages the bridge sends to the backplate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceMessage {
    /// Ask the backplate to reset; it answers with a reset-complete frame.
    Reset,
    /// Ask the backplate to push fresh telemetry.
    RequestPeriodic,
}

impl DeviceMessage {
    /// Returns a short name for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::RequestPeriodic => "request-periodic",
        }
    }
}

impl fmt::Display for DeviceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands that can be issued to the device from inside a callback.
pub trait DeviceCommands {
    /// Sends a typed message to the device.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError` if the link rejects the message.
    fn send(&mut self, message: DeviceMessage, payload: &[u8]) -> std::result::Result<(), DeviceError>;

    /// Returns whether the device currently asserts a wire.
    ///
    /// `None` means the device has not reported the wire.
    fn wire_asserted(&self, wire: WireId) -> Option<bool>;
}

/// An open link to the backplate.
///
/// Implementations decode frames and call back into a [`DeviceListener`].
/// None of the methods except [`readable`](Self::readable) may block.
#[allow(async_fn_in_trait)]
pub trait DeviceSession: DeviceCommands {
    /// Waits until input is pending on the link.
    ///
    /// Must be cancel-safe: the bridge drops this future whenever another
    /// source becomes ready first.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::Disconnected` if the link is gone.
    async fn readable(&mut self) -> std::result::Result<(), DeviceError>;

    /// Drains pending input and dispatches every complete frame.
    ///
    /// Returns the number of frames dispatched, which is zero when nothing
    /// was pending.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the link or by a listener.
    fn read(&mut self, listener: &mut dyn DeviceListener) -> Result<usize>;

    /// Connects or disconnects a wire and returns whether it succeeded.
    ///
    /// The caller reads the outcome back through
    /// [`wire_asserted`](DeviceCommands::wire_asserted). Implementations are
    /// not required to report the change through
    /// [`DeviceListener::on_wire_asserted`]; `listener` receives whatever
    /// frames arrive while the wire is being switched.
    fn set_wire(&mut self, wire: WireId, connect: bool, listener: &mut dyn DeviceListener) -> bool;
}

/// Receiver for decoded device frames.
pub trait DeviceListener {
    /// A log line produced by the backplate firmware.
    fn on_log(&mut self, message: &str);

    /// A temperature/humidity sample.
    fn on_weather(&mut self, reading: WeatherReading);

    /// A power-status sample.
    fn on_power_status(&mut self, status: &PowerStatus);

    /// The device reported a wire state change.
    fn on_wire_asserted(&mut self, wire: WireId, connect: bool);

    /// The backplate finished resetting and reported the wires it found.
    ///
    /// # Errors
    ///
    /// Returns a fatal error if post-reset setup fails.
    fn on_reset_complete(&mut self, device: &mut dyn DeviceCommands, present: WireMask) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_message_display() {
        assert_eq!(DeviceMessage::Reset.to_string(), "reset");
        assert_eq!(DeviceMessage::RequestPeriodic.to_string(), "request-periodic");
    }
}
