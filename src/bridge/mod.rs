// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The bridge loop.
//!
//! A [`Bridge`] owns the device session, the control channel and the event
//! publisher, and multiplexes them on a single task:
//!
//! 1. If the refresh deadline has passed, ask the device for telemetry.
//! 2. Wait until the device, the control channel or (once bound) the
//!    publisher has input, or until the refresh deadline.
//! 3. Service every ready source once: device frames, one control request,
//!    one subscription notice.
//!
//! Handlers never suspend, so device state is never observed half-updated.
//!
//! # Examples
//!
//! ```no_run
//! use backplate_bridge::{Bridge, BridgeConfig};
//! use backplate_bridge::device::DeviceSession;
//! use backplate_bridge::transport::mqtt::MqttTransport;
//!
//! # async fn example(device: impl DeviceSession) -> backplate_bridge::Result<()> {
//! let config = BridgeConfig::load("/etc/backplate-bridge.json")?;
//! let (control, publisher) = MqttTransport::connect(&config).await?;
//!
//! let mut bridge = Bridge::new(device, control, publisher, &config);
//! bridge.run().await
//! # }
//! ```

mod listener;
mod schedule;

pub use listener::BridgeListener;
pub use schedule::RefreshSchedule;

use tokio::time::Instant;

use crate::codec;
use crate::config::BridgeConfig;
use crate::control;
use crate::device::{DeviceMessage, DeviceSession};
use crate::error::{Error, Result};
use crate::state::DeviceState;
use crate::transport::{ControlChannel, EventPublisher};

/// Bridge between one backplate and the message bus.
pub struct Bridge<D, C, P> {
    device: D,
    control: C,
    listener: BridgeListener<P>,
}

impl<D, C, P> Bridge<D, C, P>
where
    D: DeviceSession,
    C: ControlChannel,
    P: EventPublisher,
{
    /// Creates a bridge over an open device session and unbound channels.
    ///
    /// The first refresh is due immediately.
    pub fn new(device: D, control: C, publisher: P, config: &BridgeConfig) -> Self {
        let schedule = RefreshSchedule::new(config.refresh_interval(), Instant::now());
        Self {
            device,
            control,
            listener: BridgeListener::new(publisher, schedule),
        }
    }

    /// Asks the backplate to reset.
    ///
    /// The publisher is bound once the backplate reports reset completion.
    ///
    /// # Errors
    ///
    /// Returns a fatal `Error::Setup` if the reset cannot be sent.
    pub fn start(&mut self) -> Result<()> {
        self.device
            .send(DeviceMessage::Reset, &[])
            .map_err(|e| Error::setup("reset backplate", e))?;
        tracing::info!("Waiting for backplate reset");
        Ok(())
    }

    /// Runs [`start`](Self::start) and then loops until a fatal error.
    ///
    /// # Errors
    ///
    /// Only returns on a fatal error.
    pub async fn run(&mut self) -> Result<()> {
        self.start()?;
        loop {
            self.tick().await?;
        }
    }

    /// Runs one loop iteration.
    ///
    /// A non-fatal readiness error is logged and the sources are serviced
    /// anyway; servicing never blocks.
    ///
    /// # Errors
    ///
    /// Returns only fatal errors; everything else is logged.
    pub async fn tick(&mut self) -> Result<()> {
        let now = Instant::now();
        if self.listener.schedule().is_due(now) {
            self.listener.request_periodic(&mut self.device, now);
        }

        let deadline = self.listener.schedule().deadline();
        let bound = self.listener.is_bound();
        let listener = &mut self.listener;

        let ready: Result<()> = tokio::select! {
            r = self.device.readable() => r.map_err(Error::from),
            r = self.control.readable() => r.map_err(Error::from),
            r = listener.publisher_mut().readable(), if bound => r.map_err(Error::from),
            () = tokio::time::sleep_until(deadline) => return Ok(()),
        };
        if let Err(e) = ready {
            if e.is_fatal() {
                tracing::error!(error = %e, "Bridge source failed");
                return Err(e);
            }
            tracing::warn!(error = %e, "Poll failed");
        }

        self.service_device()?;
        self.service_control();
        if self.listener.is_bound() {
            self.service_subscriptions();
        }
        Ok(())
    }

    fn service_device(&mut self) -> Result<()> {
        match self.device.read(&mut self.listener) {
            Ok(0) => Ok(()),
            Ok(frames) => {
                tracing::trace!(frames, "Dispatched device frames");
                Ok(())
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "Device read failed");
                Err(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Device read failed");
                Ok(())
            }
        }
    }

    fn service_control(&mut self) {
        let Some(payload) = self.control.try_recv() else {
            return;
        };
        let request = match codec::decode_request(&payload) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, bytes = payload.len(), "Dropping undecodable control request");
                return;
            }
        };

        let reply = control::apply(&mut self.device, &mut self.listener, &request);
        for (item, ok) in request.items().iter().zip(reply.results()) {
            if let (true, Ok(change)) = (*ok, item.change()) {
                let asserted = self.device.wire_asserted(change.wire).unwrap_or(change.connect);
                self.listener.record_wire(change.wire, asserted);
            }
        }

        match codec::encode_reply(&reply) {
            Ok(payload) => {
                if let Err(e) = self.control.send_reply(payload) {
                    tracing::warn!(error = %e, "Failed to send control reply");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to encode control reply"),
        }
    }

    fn service_subscriptions(&mut self) {
        if let Some(notice) = self.listener.publisher_mut().try_recv_notice() {
            self.listener.on_subscription_notice(&notice, &self.device);
        }
    }

    /// Returns the device session.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Returns the device session mutably.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Returns the tracked device state.
    pub fn state(&self) -> &DeviceState {
        self.listener.state()
    }

    /// Returns when the next periodic refresh is due.
    pub fn next_refresh(&self) -> Instant {
        self.listener.schedule().deadline()
    }

    /// Returns `true` once the backplate has reset and events are published.
    pub fn is_publishing(&self) -> bool {
        self.listener.is_bound()
    }
}
