// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events published to bus subscribers.
//!
//! Device callbacks are translated into [`OutboundEvent`] records by the
//! functions in this module. A new subscriber gets a [`snapshot`] of the
//! whole known state.
//!
//! # Examples
//!
//! ```
//! use backplate_bridge::event::{weather_event, snapshot};
//! use backplate_bridge::state::DeviceState;
//! use backplate_bridge::types::WeatherReading;
//!
//! let reading = WeatherReading::from_raw(2150, 455);
//! let event = weather_event(reading);
//! assert_eq!(event.weather(), Some(&reading));
//!
//! let mut state = DeviceState::new();
//! state.set_weather(reading);
//! assert_eq!(snapshot(&state), event);
//! ```

mod encoder;
mod notice;
mod outbound;
mod snapshot;

pub use encoder::{battery_event, weather_event, wire_event};
pub use notice::SubscriptionNotice;
pub use outbound::OutboundEvent;
pub use snapshot::snapshot;
