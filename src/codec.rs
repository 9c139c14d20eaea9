// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus message serialization.
//!
//! Messages on the control and publish channels are JSON documents. The
//! bridge side encodes events and replies and decodes requests; the client
//! side helpers are provided for callers and tests.
//!
//! # Examples
//!
//! ```
//! use backplate_bridge::codec;
//! use backplate_bridge::event::weather_event;
//! use backplate_bridge::types::WeatherReading;
//!
//! let bytes = codec::encode_event(&weather_event(WeatherReading::from_raw(2150, 455))).unwrap();
//! assert_eq!(bytes, br#"{"weather":{"temperature":2150,"humidity":455}}"#);
//! ```

use crate::control::{ControlReply, ControlRequest};
use crate::error::CodecError;
use crate::event::OutboundEvent;

/// Encodes an event for the publish channel.
///
/// # Errors
///
/// Returns `CodecError` if serialization fails.
pub fn encode_event(event: &OutboundEvent) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(event).map_err(Into::into)
}

/// Decodes an event received from the publish channel.
///
/// # Errors
///
/// Returns `CodecError` if the payload is not a valid event.
pub fn decode_event(payload: &[u8]) -> Result<OutboundEvent, CodecError> {
    serde_json::from_slice(payload).map_err(Into::into)
}

/// Encodes a control request.
///
/// # Errors
///
/// Returns `CodecError` if serialization fails.
pub fn encode_request(request: &ControlRequest) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(request).map_err(Into::into)
}

/// Decodes a control request received on the control channel.
///
/// # Errors
///
/// Returns `CodecError` if the payload is not a valid request. Wire ids
/// are validated per item when the request is applied, not here.
pub fn decode_request(payload: &[u8]) -> Result<ControlRequest, CodecError> {
    serde_json::from_slice(payload).map_err(Into::into)
}

/// Encodes a control reply.
///
/// # Errors
///
/// Returns `CodecError` if serialization fails.
pub fn encode_reply(reply: &ControlReply) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(reply).map_err(Into::into)
}

/// Decodes a control reply.
///
/// # Errors
///
/// Returns `CodecError` if the payload is not a valid reply.
pub fn decode_reply(payload: &[u8]) -> Result<ControlReply, CodecError> {
    serde_json::from_slice(payload).map_err(Into::into)
}
