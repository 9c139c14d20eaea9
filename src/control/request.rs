// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control request and reply records.

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::types::{WireChange, WireId};

/// One item of a [`ControlRequest`] as received from the bus.
///
/// The wire id is kept raw so that an out-of-range id fails only its own
/// item. Use [`WireRequest::change`] to validate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRequest {
    /// Raw wire identifier.
    pub wire: u32,
    /// `true` to connect, `false` to disconnect.
    pub connect: bool,
}

impl WireRequest {
    /// Creates a request item.
    #[must_use]
    pub const fn new(wire: u32, connect: bool) -> Self {
        Self { wire, connect }
    }

    /// Validates the wire id.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the wire id is not a valid
    /// [`WireId`].
    pub fn change(&self) -> Result<WireChange, ValueError> {
        let id = u8::try_from(self.wire).map_err(|_| ValueError::OutOfRange {
            min: 0,
            max: u16::from(WireId::MAX),
            actual: u16::try_from(self.wire).unwrap_or(u16::MAX),
        })?;
        Ok(WireChange::new(WireId::new(id)?, self.connect))
    }
}

impl From<WireChange> for WireRequest {
    fn from(change: WireChange) -> Self {
        Self::new(u32::from(change.wire.value()), change.connect)
    }
}

/// A batch of wire changes requested by a remote client.
///
/// # Examples
///
/// ```
/// use backplate_bridge::control::{ControlRequest, WireRequest};
///
/// let request = ControlRequest::new(vec![
///     WireRequest::new(2, true),
///     WireRequest::new(5, false),
/// ]);
/// assert_eq!(request.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    #[serde(default)]
    set_hvac_wire: Vec<WireRequest>,
}

impl ControlRequest {
    /// Creates a request from items, applied in the given order.
    #[must_use]
    pub fn new(set_hvac_wire: Vec<WireRequest>) -> Self {
        Self { set_hvac_wire }
    }

    /// Returns the request items in request order.
    #[must_use]
    pub fn items(&self) -> &[WireRequest] {
        &self.set_hvac_wire
    }

    /// Returns the number of items in the request.
    #[must_use]
    pub fn len(&self) -> usize {
        self.set_hvac_wire.len()
    }

    /// Returns `true` if the request has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set_hvac_wire.is_empty()
    }
}

/// Per-item outcome of a [`ControlRequest`].
///
/// A reply is built from a request by [`ControlReply::for_request`], so it
/// always has one entry per request item, in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlReply {
    #[serde(default)]
    set_hvac_wire_success: Vec<bool>,
}

impl ControlReply {
    /// Builds a reply by evaluating `apply` once per request item, in order.
    pub fn for_request<F>(request: &ControlRequest, apply: F) -> Self
    where
        F: FnMut(&WireRequest) -> bool,
    {
        Self {
            set_hvac_wire_success: request.items().iter().map(apply).collect(),
        }
    }

    /// Returns the per-item success flags.
    #[must_use]
    pub fn results(&self) -> &[bool] {
        &self.set_hvac_wire_success
    }

    /// Returns the number of items in the reply.
    #[must_use]
    pub fn len(&self) -> usize {
        self.set_hvac_wire_success.len()
    }

    /// Returns `true` if the reply has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set_hvac_wire_success.is_empty()
    }

    /// Returns the number of items that failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.set_hvac_wire_success.iter().filter(|ok| !**ok).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_from_json() {
        let json = r#"{"set_hvac_wire":[{"wire":2,"connect":true},{"wire":5,"connect":false}]}"#;
        let request: ControlRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.items(),
            &[WireRequest::new(2, true), WireRequest::new(5, false)]
        );
    }

    #[test]
    fn out_of_range_wire_fails_only_its_item() {
        let json = r#"{"set_hvac_wire":[{"wire":2,"connect":true},{"wire":99,"connect":true}]}"#;
        let request: ControlRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.len(), 2);
        assert_eq!(
            request.items()[0].change().unwrap(),
            WireChange::new(WireId::new(2).unwrap(), true)
        );
        assert!(matches!(
            request.items()[1].change(),
            Err(ValueError::OutOfRange { actual: 99, .. })
        ));
    }

    #[test]
    fn wide_wire_id_is_out_of_range() {
        assert!(matches!(
            WireRequest::new(70_000, true).change(),
            Err(ValueError::OutOfRange { actual: u16::MAX, .. })
        ));
        assert!(WireRequest::new(300, false).change().is_err());
    }

    #[test]
    fn reply_matches_request_order() {
        let request = ControlRequest::new(vec![
            WireRequest::new(1, true),
            WireRequest::new(3, true),
            WireRequest::new(8, false),
        ]);
        let reply = ControlReply::for_request(&request, |item| item.wire != 3);
        assert_eq!(reply.results(), &[true, false, true]);
        assert_eq!(reply.failures(), 1);
    }

    #[test]
    fn empty_request_gets_empty_reply() {
        let reply = ControlReply::for_request(&ControlRequest::default(), |_| true);
        assert!(reply.is_empty());
        assert_eq!(serde_json::to_string(&reply).unwrap(), r#"{"set_hvac_wire_success":[]}"#);
    }
}
