// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known backplate state.
//!
//! The [`DeviceState`] struct is owned by the bridge and updated from device
//! callbacks. It is what new subscribers see in their snapshot event.
//!
//! # Examples
//!
//! ```
//! use backplate_bridge::state::DeviceState;
//! use backplate_bridge::types::{WeatherReading, WireId};
//!
//! let mut state = DeviceState::new();
//! state.set_weather(WeatherReading::from_raw(2150, 455));
//! state.set_wire(WireId::new(2).unwrap(), true);
//!
//! assert_eq!(state.wire(WireId::new(2).unwrap()), Some(true));
//! assert_eq!(state.wire(WireId::new(3).unwrap()), None);
//! ```

mod device_state;

pub use device_state::{DeviceState, PowerReading};
