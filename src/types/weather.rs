// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature and humidity readings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Temperature in hundredths of a degree Celsius.
///
/// # Examples
///
/// ```
/// use backplate_bridge::types::Temperature;
///
/// let t = Temperature::from_centi_celsius(2150);
/// assert_eq!(t.to_string(), "21.50 C");
/// assert_eq!(t.fahrenheit().to_string(), "70.700 F");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temperature(u16);

impl Temperature {
    /// Creates a temperature from the raw centi-degree value.
    #[must_use]
    pub const fn from_centi_celsius(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw centi-degree value.
    #[must_use]
    pub const fn centi_celsius(&self) -> u16 {
        self.0
    }

    /// Returns the same temperature in thousandths of a degree Fahrenheit.
    #[must_use]
    pub fn fahrenheit(&self) -> Fahrenheit {
        // centi-C * 9/5 * 10 = milli-F offset
        Fahrenheit(u32::from(self.0) * 90 / 5 + 32_000)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02} C", self.0 / 100, self.0 % 100)
    }
}

/// Temperature in thousandths of a degree Fahrenheit, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fahrenheit(u32);

impl Fahrenheit {
    /// Returns the raw milli-degree value.
    #[must_use]
    pub const fn milli_fahrenheit(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Fahrenheit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03} F", self.0 / 1000, self.0 % 1000)
    }
}

/// Relative humidity in tenths of a percent.
///
/// # Examples
///
/// ```
/// use backplate_bridge::types::Humidity;
///
/// assert_eq!(Humidity::from_deci_percent(455).to_string(), "45.5%");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Humidity(u16);

impl Humidity {
    /// Creates a humidity from the raw deci-percent value.
    #[must_use]
    pub const fn from_deci_percent(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw deci-percent value.
    #[must_use]
    pub const fn deci_percent(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Humidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}%", self.0 / 10, self.0 % 10)
    }
}

/// One weather sample from the backplate sensors.
///
/// Temperature and humidity always arrive together, so a reading is either
/// complete or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Temperature in centi-degrees Celsius.
    pub temperature: Temperature,
    /// Relative humidity in deci-percent.
    pub humidity: Humidity,
}

impl WeatherReading {
    /// Creates a reading from raw backplate values.
    #[must_use]
    pub const fn from_raw(temperature: u16, humidity: u16) -> Self {
        Self {
            temperature: Temperature::from_centi_celsius(temperature),
            humidity: Humidity::from_deci_percent(humidity),
        }
    }
}

impl fmt::Display for WeatherReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fahrenheit = self.temperature.fahrenheit();
        write!(
            f,
            "Temperature {} ({})    Humidity: {}",
            self.temperature, fahrenheit, self.humidity
        )
    }
}
