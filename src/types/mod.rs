// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for backplate telemetry and wire control.
//!
//! Raw backplate readings are fixed-point integers. The types here keep the
//! raw value (which is what goes on the bus) and know how to render it for
//! humans.
//!
//! # Types
//!
//! - [`WireId`] - HVAC wire identifier (0-15)
//! - [`WireMask`] - Bitmask of wires present on the backplate
//! - [`WireChange`] - A wire and its desired or asserted connection
//! - [`Temperature`] - Centi-degrees Celsius
//! - [`Humidity`] - Deci-percent relative humidity
//! - [`WeatherReading`] - One temperature/humidity sample
//! - [`PowerStatus`] - Raw power-status telemetry
//! - [`Battery`] - Charging flag and battery voltage

mod power;
mod weather;
mod wire;

pub use power::{Battery, Millivolts, PowerStatus};
pub use weather::{Fahrenheit, Humidity, Temperature, WeatherReading};
pub use wire::{WireChange, WireId, WireMask};
