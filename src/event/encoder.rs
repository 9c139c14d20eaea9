// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping from device telemetry to outbound events.
//!
//! Each function builds an event carrying exactly one sub-record.

use crate::types::{PowerStatus, WeatherReading, WireChange, WireId};

use super::OutboundEvent;

/// Builds the event for a weather callback.
#[must_use]
pub fn weather_event(reading: WeatherReading) -> OutboundEvent {
    OutboundEvent::new().with_weather(reading)
}

/// Builds the event for a power-status callback.
///
/// Only the charging flag and the battery voltage are carried.
#[must_use]
pub fn battery_event(status: &PowerStatus) -> OutboundEvent {
    OutboundEvent::new().with_battery(status.battery())
}

/// Builds the event for a wire the device has just asserted.
#[must_use]
pub fn wire_event(wire: WireId, connect: bool) -> OutboundEvent {
    let mut event = OutboundEvent::new();
    event.push_wire_change(WireChange::new(wire, connect));
    event
}
