// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use std::collections::BTreeMap;

use crate::types::{Battery, PowerStatus, WeatherReading, WireId, WireMask};

/// The part of a power-status frame that the bridge keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerReading {
    /// Raw status flags.
    pub flags: u8,
    /// Battery voltage in millivolts.
    pub battery_mv: u16,
}

impl PowerReading {
    /// Returns the battery sub-record for this reading.
    #[must_use]
    pub const fn battery(&self) -> Battery {
        Battery::from_flags(self.flags, self.battery_mv)
    }
}

impl From<&PowerStatus> for PowerReading {
    fn from(status: &PowerStatus) -> Self {
        Self {
            flags: status.flags,
            battery_mv: status.vb_mv,
        }
    }
}

/// Tracked state of the backplate.
///
/// All readings are optional because nothing is known until the backplate
/// reports it. Wire assertions are tri-state: a wire that has never been
/// observed is absent, which [`DeviceState::wire`] reports as `None`.
///
/// # Examples
///
/// ```
/// use backplate_bridge::state::DeviceState;
/// use backplate_bridge::types::WireId;
///
/// let mut state = DeviceState::new();
/// state.set_wire(WireId::new(4).unwrap(), false);
/// state.set_wire(WireId::new(1).unwrap(), true);
///
/// let wires: Vec<_> = state.known_wires().map(|(w, c)| (w.value(), c)).collect();
/// assert_eq!(wires, vec![(1, true), (4, false)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    /// Last temperature/humidity sample.
    weather: Option<WeatherReading>,
    /// Last power-status sample.
    power: Option<PowerReading>,
    /// Asserted state per observed wire, ordered by wire id.
    wires: BTreeMap<WireId, bool>,
    /// Wires reported present at reset.
    present_wires: Option<WireMask>,
}

impl DeviceState {
    /// Creates a new empty device state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Weather ==========

    /// Gets the last weather reading.
    #[must_use]
    pub fn weather(&self) -> Option<WeatherReading> {
        self.weather
    }

    /// Records a weather reading, replacing the previous one.
    pub fn set_weather(&mut self, reading: WeatherReading) {
        self.weather = Some(reading);
    }

    // ========== Power ==========

    /// Gets the last power reading.
    #[must_use]
    pub fn power(&self) -> Option<PowerReading> {
        self.power
    }

    /// Records the tracked fields of a power-status frame.
    pub fn set_power(&mut self, status: &PowerStatus) {
        self.power = Some(PowerReading::from(status));
    }

    /// Gets the battery state derived from the last power reading.
    #[must_use]
    pub fn battery(&self) -> Option<Battery> {
        self.power.map(|p| p.battery())
    }

    // ========== Wires ==========

    /// Gets the asserted state of a wire.
    ///
    /// Returns `None` if the wire has never been observed.
    #[must_use]
    pub fn wire(&self, wire: WireId) -> Option<bool> {
        self.wires.get(&wire).copied()
    }

    /// Records the asserted state of a wire.
    pub fn set_wire(&mut self, wire: WireId, connect: bool) {
        self.wires.insert(wire, connect);
    }

    /// Returns every observed wire and its asserted state, in ascending
    /// wire-id order.
    pub fn known_wires(&self) -> impl Iterator<Item = (WireId, bool)> + '_ {
        self.wires.iter().map(|(wire, connect)| (*wire, *connect))
    }

    /// Gets the wires reported present at the last reset.
    #[must_use]
    pub fn present_wires(&self) -> Option<WireMask> {
        self.present_wires
    }

    /// Records the wires reported present at reset.
    pub fn set_present_wires(&mut self, mask: WireMask) {
        self.present_wires = Some(mask);
    }
}
