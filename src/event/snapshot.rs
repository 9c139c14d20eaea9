// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Full-state snapshot for newly joined subscribers.

use crate::state::DeviceState;
use crate::types::WireChange;

use super::OutboundEvent;

/// Builds one event describing everything currently known.
///
/// Weather and battery are included only if a reading exists. Every observed
/// wire gets one entry in ascending wire-id order; unobserved wires are left
/// out.
///
/// # Examples
///
/// ```
/// use backplate_bridge::event::snapshot;
/// use backplate_bridge::state::DeviceState;
///
/// let event = snapshot(&DeviceState::new());
/// assert!(event.is_empty());
/// ```
#[must_use]
pub fn snapshot(state: &DeviceState) -> OutboundEvent {
    let mut event = OutboundEvent::new();
    if let Some(weather) = state.weather() {
        event = event.with_weather(weather);
    }
    if let Some(battery) = state.battery() {
        event = event.with_battery(battery);
    }
    for (wire, connect) in state.known_wires() {
        event.push_wire_change(WireChange::new(wire, connect));
    }
    event
}
