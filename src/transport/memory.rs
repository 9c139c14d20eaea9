// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process channels.
//!
//! Useful when the bridge is embedded next to its clients, and for tests.
//! Each constructor returns the bridge-side half and the client-side half.
//!
//! # Examples
//!
//! ```
//! use backplate_bridge::transport::{memory, ControlChannel};
//!
//! let (mut channel, client) = memory::control_channel(8);
//! client.submit(b"{}".to_vec()).unwrap();
//!
//! assert_eq!(channel.try_recv(), Some(b"{}".to_vec()));
//! ```

use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::transport::{ControlChannel, EventPublisher, Inbox, try_queue};

/// Notice byte sent by [`EventTap::subscribe`].
const SUBSCRIBE: u8 = 1;

/// Notice byte sent by [`EventTap::unsubscribe`].
const UNSUBSCRIBE: u8 = 0;

/// Creates an in-process control channel with the given queue capacity.
#[must_use]
pub fn control_channel(capacity: usize) -> (MemoryControlChannel, ControlClient) {
    let (request_tx, request_rx) = mpsc::channel(capacity);
    let (reply_tx, reply_rx) = mpsc::channel(capacity);
    (
        MemoryControlChannel {
            requests: Inbox::new("control", request_rx),
            replies: reply_tx,
        },
        ControlClient {
            requests: request_tx,
            replies: reply_rx,
        },
    )
}

/// Creates an in-process publish channel with the given queue capacity.
#[must_use]
pub fn event_channel(capacity: usize) -> (MemoryPublisher, EventTap) {
    let (event_tx, event_rx) = mpsc::channel(capacity);
    let (notice_tx, notice_rx) = mpsc::channel(capacity);
    (
        MemoryPublisher {
            events: event_tx,
            notices: Inbox::new("subscriptions", notice_rx),
            bound: false,
        },
        EventTap {
            events: event_rx,
            notices: notice_tx,
        },
    )
}

/// Bridge side of an in-process control channel.
#[derive(Debug)]
pub struct MemoryControlChannel {
    requests: Inbox,
    replies: mpsc::Sender<Vec<u8>>,
}

impl ControlChannel for MemoryControlChannel {
    async fn readable(&mut self) -> Result<(), TransportError> {
        self.requests.readable().await
    }

    fn try_recv(&mut self) -> Option<Vec<u8>> {
        self.requests.try_recv()
    }

    fn send_reply(&mut self, payload: Vec<u8>) -> Result<(), TransportError> {
        try_queue("control reply", &self.replies, payload)
    }
}

/// Client side of an in-process control channel.
#[derive(Debug)]
pub struct ControlClient {
    requests: mpsc::Sender<Vec<u8>>,
    replies: mpsc::Receiver<Vec<u8>>,
}

impl ControlClient {
    /// Queues a serialized request for the bridge.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the queue is full or the bridge is gone.
    pub fn submit(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        try_queue("control", &self.requests, payload)
    }

    /// Waits for the next reply. Returns `None` once the bridge is gone.
    pub async fn reply(&mut self) -> Option<Vec<u8>> {
        self.replies.recv().await
    }

    /// Takes the next reply without waiting.
    pub fn try_reply(&mut self) -> Option<Vec<u8>> {
        self.replies.try_recv().ok()
    }
}

/// Bridge side of an in-process publish channel.
///
/// Events published before [`bind`](EventPublisher::bind) are discarded.
#[derive(Debug)]
pub struct MemoryPublisher {
    events: mpsc::Sender<Vec<u8>>,
    notices: Inbox,
    bound: bool,
}

impl MemoryPublisher {
    /// Returns `true` once the publisher has been bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound
    }
}

impl EventPublisher for MemoryPublisher {
    fn bind(&mut self) -> Result<(), TransportError> {
        self.bound = true;
        Ok(())
    }

    fn publish(&mut self, payload: Vec<u8>) -> Result<(), TransportError> {
        if !self.bound {
            tracing::trace!("Discarding event on unbound memory publisher");
            return Ok(());
        }
        try_queue("events", &self.events, payload)
    }

    async fn readable(&mut self) -> Result<(), TransportError> {
        self.notices.readable().await
    }

    fn try_recv_notice(&mut self) -> Option<Vec<u8>> {
        self.notices.try_recv()
    }
}

/// Client side of an in-process publish channel.
#[derive(Debug)]
pub struct EventTap {
    events: mpsc::Receiver<Vec<u8>>,
    notices: mpsc::Sender<Vec<u8>>,
}

impl EventTap {
    /// Announces a new subscriber to the bridge.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the queue is full or the bridge is gone.
    pub fn subscribe(&self) -> Result<(), TransportError> {
        self.notify(vec![SUBSCRIBE])
    }

    /// Announces that a subscriber left.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the queue is full or the bridge is gone.
    pub fn unsubscribe(&self) -> Result<(), TransportError> {
        self.notify(vec![UNSUBSCRIBE])
    }

    /// Sends a raw subscription notice.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the queue is full or the bridge is gone.
    pub fn notify(&self, raw: Vec<u8>) -> Result<(), TransportError> {
        try_queue("subscriptions", &self.notices, raw)
    }

    /// Waits for the next event. Returns `None` once the bridge is gone.
    pub async fn next_event(&mut self) -> Option<Vec<u8>> {
        self.events.recv().await
    }

    /// Takes the next event without waiting.
    pub fn try_next_event(&mut self) -> Option<Vec<u8>> {
        self.events.try_recv().ok()
    }
}
