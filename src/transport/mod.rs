// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus channels used by the bridge.
//!
//! The bridge talks to remote clients through two channels:
//!
//! - [`ControlChannel`]: request/reply; one serialized request in, one
//!   serialized reply out.
//! - [`EventPublisher`]: publish/subscribe; serialized events out,
//!   subscription notices in.
//!
//! # Implementations
//!
//! - [`memory`]: in-process channels backed by tokio mpsc
//! - [`mqtt`]: MQTT broker connection (feature `mqtt`)

pub mod memory;
#[cfg(feature = "mqtt")]
pub mod mqtt;

use tokio::sync::mpsc;

use crate::error::TransportError;

/// Request/reply channel carrying control requests.
#[allow(async_fn_in_trait)]
pub trait ControlChannel {
    /// Waits until a request is pending.
    ///
    /// Must be cancel-safe: a request received while the future is being
    /// dropped must still be returned by the next [`try_recv`](Self::try_recv).
    ///
    /// # Errors
    ///
    /// Returns `TransportError::ChannelClosed` if no more requests can arrive.
    async fn readable(&mut self) -> Result<(), TransportError>;

    /// Takes the next pending request without waiting.
    fn try_recv(&mut self) -> Option<Vec<u8>>;

    /// Sends the reply for the last request.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the reply cannot be queued.
    fn send_reply(&mut self, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// Publish/subscribe channel carrying events and subscription notices.
#[allow(async_fn_in_trait)]
pub trait EventPublisher {
    /// Exposes the publisher to subscribers.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the endpoint cannot be exposed.
    fn bind(&mut self) -> Result<(), TransportError>;

    /// Publishes one serialized event to every subscriber.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the event cannot be queued.
    fn publish(&mut self, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Waits until a subscription notice is pending.
    ///
    /// Must be cancel-safe, like [`ControlChannel::readable`].
    ///
    /// # Errors
    ///
    /// Returns `TransportError::ChannelClosed` if no more notices can arrive.
    async fn readable(&mut self) -> Result<(), TransportError>;

    /// Takes the next pending subscription notice without waiting.
    fn try_recv_notice(&mut self) -> Option<Vec<u8>>;
}

/// Receiving half of a channel with a one-message lookahead slot.
///
/// `readable` parks the received message in the slot so that dropping the
/// wait never loses it.
#[derive(Debug)]
pub(crate) struct Inbox {
    name: &'static str,
    rx: mpsc::Receiver<Vec<u8>>,
    pending: Option<Vec<u8>>,
}

impl Inbox {
    pub(crate) fn new(name: &'static str, rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            name,
            rx,
            pending: None,
        }
    }

    pub(crate) async fn readable(&mut self) -> Result<(), TransportError> {
        if self.pending.is_none() {
            let message = self
                .rx
                .recv()
                .await
                .ok_or_else(|| TransportError::ChannelClosed(self.name.to_string()))?;
            self.pending = Some(message);
        }
        Ok(())
    }

    pub(crate) fn try_recv(&mut self) -> Option<Vec<u8>> {
        self.pending.take().or_else(|| self.rx.try_recv().ok())
    }
}

/// Queues a message without waiting, mapping mpsc failures.
pub(crate) fn try_queue(
    name: &'static str,
    tx: &mpsc::Sender<Vec<u8>>,
    payload: Vec<u8>,
) -> Result<(), TransportError> {
    tx.try_send(payload).map_err(|e| match e {
        mpsc::error::TrySendError::Full(_) => TransportError::ChannelFull(name.to_string()),
        mpsc::error::TrySendError::Closed(_) => TransportError::ChannelClosed(name.to_string()),
    })
}
