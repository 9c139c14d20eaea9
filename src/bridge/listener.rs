// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device callbacks of the bridge.
//!
//! [`BridgeListener`] owns the tracked [`DeviceState`], the refresh schedule
//! and the event publisher. Every device frame updates the state first and
//! then emits exactly one event.

use tokio::time::Instant;

use crate::codec;
use crate::device::{DeviceCommands, DeviceListener, DeviceMessage};
use crate::error::{Error, Result};
use crate::event::{self, OutboundEvent, SubscriptionNotice};
use crate::state::DeviceState;
use crate::transport::EventPublisher;
use crate::types::{PowerStatus, WeatherReading, WireId, WireMask};

use super::schedule::RefreshSchedule;

/// Device listener that mirrors device frames onto the publish channel.
#[derive(Debug)]
pub struct BridgeListener<P> {
    publisher: P,
    state: DeviceState,
    schedule: RefreshSchedule,
    reset_complete: bool,
    bound: bool,
}

impl<P: EventPublisher> BridgeListener<P> {
    /// Creates a listener with empty state and the given schedule.
    pub fn new(publisher: P, schedule: RefreshSchedule) -> Self {
        Self {
            publisher,
            state: DeviceState::new(),
            schedule,
            reset_complete: false,
            bound: false,
        }
    }

    /// Returns the tracked device state.
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Returns the refresh schedule.
    pub fn schedule(&self) -> &RefreshSchedule {
        &self.schedule
    }

    /// Returns `true` once the publisher has been bound.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Returns the event publisher.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Returns the event publisher mutably.
    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    /// Asks the device for fresh telemetry and moves the deadline.
    ///
    /// A failed send is logged; the deadline moves regardless so a broken
    /// link is not hammered on every iteration.
    pub fn request_periodic(&mut self, device: &mut dyn DeviceCommands, now: Instant) {
        match device.send(DeviceMessage::RequestPeriodic, &[]) {
            Ok(()) => tracing::debug!("Requested periodic telemetry"),
            Err(e) => tracing::warn!(error = %e, "Failed to request periodic telemetry"),
        }
        self.schedule.reschedule(now);
    }

    /// Records a wire the device switched on request.
    ///
    /// Nothing is published; the device only reports wires it asserts on its
    /// own.
    pub fn record_wire(&mut self, wire: WireId, connect: bool) {
        self.state.set_wire(wire, connect);
    }

    /// Copies every wire state the device reports into the tracked state.
    ///
    /// Wires the device reports as unknown keep their tracked value.
    pub fn sync_wires(&mut self, device: &dyn DeviceCommands) {
        for wire in WireId::all() {
            if let Some(asserted) = device.wire_asserted(wire) {
                self.state.set_wire(wire, asserted);
            }
        }
    }

    /// Handles one raw subscription notice.
    ///
    /// A subscribe notice publishes a snapshot of the tracked state, with
    /// wire states refreshed from `device` first. Anything else is ignored.
    pub fn on_subscription_notice(&mut self, raw: &[u8], device: &dyn DeviceCommands) {
        match SubscriptionNotice::parse(raw) {
            Some(notice) if notice.is_subscribe() => {
                tracing::debug!(topic_len = notice.topic().len(), "New subscriber, sending snapshot");
                self.sync_wires(device);
                let snapshot = event::snapshot(&self.state);
                self.emit(&snapshot);
            }
            Some(_) => tracing::debug!("Subscriber left"),
            None => tracing::debug!("Ignoring empty subscription notice"),
        }
    }

    /// Serializes and publishes one event.
    ///
    /// Events are dropped while the publisher is unbound. Encode and publish
    /// failures are logged.
    pub fn emit(&mut self, event: &OutboundEvent) {
        if !self.bound {
            tracing::debug!("Publisher not bound yet, dropping event");
            return;
        }
        let payload = match codec::encode_event(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode event");
                return;
            }
        };
        if let Err(e) = self.publisher.publish(payload) {
            tracing::warn!(error = %e, "Failed to publish event");
        }
    }
}

impl<P: EventPublisher> DeviceListener for BridgeListener<P> {
    fn on_log(&mut self, message: &str) {
        tracing::info!("Backplate: {}", message);
    }

    fn on_weather(&mut self, reading: WeatherReading) {
        tracing::info!("{}", reading);
        self.state.set_weather(reading);
        self.emit(&event::weather_event(reading));
    }

    fn on_power_status(&mut self, status: &PowerStatus) {
        tracing::info!("{}", status);
        tracing::debug!(
            state = status.state,
            px0 = status.px0,
            u1 = status.u1,
            u2 = status.u2,
            u3 = status.u3,
            pins = status.pins,
            wires = status.wires,
            "Raw power status"
        );
        self.state.set_power(status);
        self.emit(&event::battery_event(status));
    }

    fn on_wire_asserted(&mut self, wire: WireId, connect: bool) {
        tracing::info!("Setting wire {} to {}", wire, u8::from(connect));
        self.state.set_wire(wire, connect);
        self.emit(&event::wire_event(wire, connect));
    }

    fn on_reset_complete(&mut self, device: &mut dyn DeviceCommands, present: WireMask) -> Result<()> {
        if self.reset_complete {
            tracing::debug!(present = %present, "Ignoring repeated reset completion");
            return Ok(());
        }
        self.reset_complete = true;
        tracing::info!(present = %present, "Backplate reset complete");

        self.state.set_present_wires(present);
        self.sync_wires(&*device);

        self.request_periodic(device, Instant::now());

        self.publisher
            .bind()
            .map_err(|e| Error::setup("bind event publisher", e))?;
        self.bound = true;
        Ok(())
    }
}
