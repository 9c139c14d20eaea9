// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power-related telemetry from the backplate.
//!
//! The backplate reports a power-status frame with a dozen raw fields. Only
//! the flags byte and the battery voltage are tracked and re-published; the
//! rest are logged so they can be charted from the log stream.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Flag bit that is set while the battery is *not* charging.
const NOT_CHARGING_FLAG: u8 = 0x40;

/// A voltage in millivolts, displayed as volts with three decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millivolts(pub u16);

impl fmt::Display for Millivolts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}V", self.0 / 1000, self.0 % 1000)
    }
}

/// Raw power-status telemetry.
///
/// Field names follow the backplate frame layout. Fields without a known
/// meaning are kept so they can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PowerStatus {
    /// Power state machine value.
    pub state: u8,
    /// Status flags; bit 6 is set while the battery is not charging.
    pub flags: u8,
    /// Unidentified byte following the flags.
    pub px0: u8,
    /// Unidentified reading.
    pub u1: u16,
    /// Unidentified reading.
    pub u2: u8,
    /// Unidentified reading.
    pub u3: u16,
    /// Input voltage in centivolts.
    pub vi_cv: u16,
    /// Output voltage in millivolts.
    pub vo_mv: u16,
    /// Battery voltage in millivolts.
    pub vb_mv: u16,
    /// Pin state byte.
    pub pins: u8,
    /// Wire state byte.
    pub wires: u8,
}

impl PowerStatus {
    /// Returns `true` if the flags say the battery is charging.
    #[must_use]
    pub const fn charging(&self) -> bool {
        self.flags & NOT_CHARGING_FLAG == 0
    }

    /// Returns the battery sub-record published for this status.
    #[must_use]
    pub const fn battery(&self) -> Battery {
        Battery {
            charging: self.charging(),
            voltage: self.vb_mv,
        }
    }
}

impl fmt::Display for PowerStatus {
    // Matches the stock firmware log layout.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "power status: flags {:02x}, vi {}.{:02}V, vo {}; vb {}",
            self.flags,
            self.vi_cv / 100,
            self.vi_cv % 100,
            Millivolts(self.vo_mv),
            Millivolts(self.vb_mv)
        )
    }
}

/// Battery state as published on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battery {
    /// Whether the battery is charging.
    pub charging: bool,
    /// Battery voltage in millivolts.
    pub voltage: u16,
}

impl Battery {
    /// Derives the battery state from a raw flags byte and battery voltage.
    #[must_use]
    pub const fn from_flags(flags: u8, voltage: u16) -> Self {
        Self {
            charging: flags & NOT_CHARGING_FLAG == 0,
            voltage,
        }
    }
}
