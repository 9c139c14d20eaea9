// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound event record.

use serde::{Deserialize, Serialize};

use crate::types::{Battery, WeatherReading, WireChange};

/// An event published to bus subscribers.
///
/// Every sub-record is optional. The wire-change list never holds two entries
/// for the same wire: pushing a change for a wire that is already listed
/// replaces the earlier entry in place.
///
/// # Examples
///
/// ```
/// use backplate_bridge::event::OutboundEvent;
/// use backplate_bridge::types::{WireChange, WireId};
///
/// let mut event = OutboundEvent::new();
/// event.push_wire_change(WireChange::new(WireId::new(2).unwrap(), true));
/// event.push_wire_change(WireChange::new(WireId::new(2).unwrap(), false));
///
/// assert_eq!(event.wire_changes().len(), 1);
/// assert!(!event.wire_changes()[0].connect);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weather: Option<WeatherReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    battery: Option<Battery>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    wire_change: Vec<WireChange>,
}

impl OutboundEvent {
    /// Creates an event with no sub-records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the weather sub-record.
    #[must_use]
    pub fn with_weather(mut self, weather: WeatherReading) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Sets the battery sub-record.
    #[must_use]
    pub fn with_battery(mut self, battery: Battery) -> Self {
        self.battery = Some(battery);
        self
    }

    /// Appends a wire change, replacing any entry for the same wire.
    pub fn push_wire_change(&mut self, change: WireChange) {
        match self.wire_change.iter_mut().find(|c| c.wire == change.wire) {
            Some(existing) => *existing = change,
            None => self.wire_change.push(change),
        }
    }

    /// Returns the weather sub-record.
    #[must_use]
    pub fn weather(&self) -> Option<&WeatherReading> {
        self.weather.as_ref()
    }

    /// Returns the battery sub-record.
    #[must_use]
    pub fn battery(&self) -> Option<&Battery> {
        self.battery.as_ref()
    }

    /// Returns the wire changes in insertion order.
    #[must_use]
    pub fn wire_changes(&self) -> &[WireChange] {
        &self.wire_change
    }

    /// Returns `true` if no sub-record is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weather.is_none() && self.battery.is_none() && self.wire_change.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WireId;

    #[test]
    fn empty_event_serializes_to_empty_object() {
        let json = serde_json::to_string(&OutboundEvent::new()).unwrap();
        assert_eq!(json, "{}");
        assert!(OutboundEvent::new().is_empty());
    }

    #[test]
    fn sub_records_serialize_under_their_names() {
        let mut event = OutboundEvent::new()
            .with_weather(WeatherReading::from_raw(2150, 455))
            .with_battery(Battery {
                charging: true,
                voltage: 3900,
            });
        event.push_wire_change(WireChange::new(WireId::new(1).unwrap(), true));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["weather"]["temperature"], 2150);
        assert_eq!(json["battery"]["voltage"], 3900);
        assert_eq!(json["wire_change"][0]["wire"], 1);
        assert_eq!(json["wire_change"][0]["connect"], true);
    }

    #[test]
    fn wire_changes_keep_first_position_on_replace() {
        let mut event = OutboundEvent::new();
        event.push_wire_change(WireChange::new(WireId::new(4).unwrap(), true));
        event.push_wire_change(WireChange::new(WireId::new(1).unwrap(), true));
        event.push_wire_change(WireChange::new(WireId::new(4).unwrap(), false));

        let wires: Vec<(u8, bool)> = event
            .wire_changes()
            .iter()
            .map(|c| (c.wire.value(), c.connect))
            .collect();
        assert_eq!(wires, vec![(4, false), (1, true)]);
    }

    #[test]
    fn missing_fields_deserialize_as_absent() {
        let event: OutboundEvent = serde_json::from_str("{}").unwrap();
        assert!(event.is_empty());
    }
}
