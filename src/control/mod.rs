// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote wire control.
//!
//! A [`ControlRequest`] is applied item by item against the device session.
//! Items are independent: an item naming an unknown wire or rejected by the
//! device is reported as `false` and the rest of the batch still runs.

mod request;

pub use request::{ControlReply, ControlRequest, WireRequest};

use crate::device::{DeviceListener, DeviceSession};

/// Applies every item of `request` to `device` and collects the outcomes.
///
/// The listener is handed to the device for frames it emits while a wire is
/// being switched.
pub fn apply<D>(device: &mut D, listener: &mut dyn DeviceListener, request: &ControlRequest) -> ControlReply
where
    D: DeviceSession + ?Sized,
{
    let reply = ControlReply::for_request(request, |item| {
        let change = match item.change() {
            Ok(change) => change,
            Err(e) => {
                tracing::warn!(wire = item.wire, error = %e, "Rejecting wire change");
                return false;
            }
        };
        let ok = device.set_wire(change.wire, change.connect, &mut *listener);
        if !ok {
            tracing::warn!(wire = %change.wire, connect = change.connect, "Wire change failed");
        }
        ok
    });

    tracing::debug!(
        items = reply.len(),
        failures = reply.failures(),
        "Applied control request"
    );
    reply
}
