// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HVAC wire identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Identifier of an HVAC wire terminal on the backplate.
///
/// The backplate reports wire presence as a 16-bit mask, so valid
/// identifiers are 0 through 15.
///
/// # Examples
///
/// ```
/// use backplate_bridge::types::WireId;
///
/// let wire = WireId::new(2).unwrap();
/// assert_eq!(wire.value(), 2);
///
/// assert!(WireId::new(16).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WireId(u8);

impl WireId {
    /// Highest valid wire identifier.
    pub const MAX: u8 = 15;

    /// Creates a new wire identifier.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `id` is greater than 15.
    pub fn new(id: u8) -> Result<Self, ValueError> {
        if id > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: u16::from(Self::MAX),
                actual: u16::from(id),
            });
        }
        Ok(Self(id))
    }

    /// Returns the numeric value of the identifier.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns every valid wire identifier in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=Self::MAX).map(Self)
    }
}

impl TryFrom<u8> for WireId {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WireId> for u8 {
    fn from(wire: WireId) -> Self {
        wire.0
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Set of wires the backplate detected at reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireMask(u16);

impl WireMask {
    /// Creates a mask from the raw bitmask reported by the backplate.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Returns the raw bitmask.
    #[must_use]
    pub const fn bits(&self) -> u16 {
        self.0
    }

    /// Returns `true` if the given wire is present.
    #[must_use]
    pub const fn contains(&self, wire: WireId) -> bool {
        self.0 & (1 << wire.0) != 0
    }

    /// Returns the present wires in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = WireId> + '_ {
        WireId::all().filter(|wire| self.contains(*wire))
    }
}

impl fmt::Display for WireMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

/// A wire together with a connect flag.
///
/// Used both for requested changes (control requests) and for asserted
/// state (published events).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireChange {
    /// The wire being changed.
    pub wire: WireId,
    /// `true` to connect, `false` to disconnect.
    pub connect: bool,
}

impl WireChange {
    /// Creates a new wire change.
    #[must_use]
    pub const fn new(wire: WireId, connect: bool) -> Self {
        Self { wire, connect }
    }
}
