// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted backplate for bridge tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;

use backplate_bridge::device::{DeviceCommands, DeviceListener, DeviceMessage, DeviceSession};
use backplate_bridge::error::DeviceError;
use backplate_bridge::types::{PowerStatus, WeatherReading, WireId, WireMask};
use tokio::sync::mpsc;

/// A frame the scripted backplate delivers to the bridge.
#[derive(Debug, Clone)]
pub enum Frame {
    Log(String),
    Weather { temperature: u16, humidity: u16 },
    Power(PowerStatus),
    WireAsserted { wire: u8, connect: bool },
    ResetComplete(u16),
}

/// Test-side handle feeding frames into a [`MockDevice`].
#[derive(Debug, Clone)]
pub struct Backplate {
    frames: mpsc::UnboundedSender<Frame>,
}

impl Backplate {
    pub fn push(&self, frame: Frame) {
        self.frames.send(frame).unwrap();
    }

    pub fn weather(&self, temperature: u16, humidity: u16) {
        self.push(Frame::Weather {
            temperature,
            humidity,
        });
    }

    pub fn reset_complete(&self, present: u16) {
        self.push(Frame::ResetComplete(present));
    }
}

/// Device session driven by a [`Backplate`] handle.
#[derive(Debug)]
pub struct MockDevice {
    frames: mpsc::UnboundedReceiver<Frame>,
    pending: VecDeque<Frame>,
    sent: Vec<DeviceMessage>,
    asserted: BTreeMap<WireId, bool>,
    failing_wires: BTreeSet<u8>,
    link_down: bool,
    echo_wire_sets: bool,
    fail_next_readable: bool,
}

impl MockDevice {
    pub fn new() -> (Self, Backplate) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                frames: rx,
                pending: VecDeque::new(),
                sent: Vec::new(),
                asserted: BTreeMap::new(),
                failing_wires: BTreeSet::new(),
                link_down: false,
                echo_wire_sets: false,
                fail_next_readable: false,
            },
            Backplate { frames: tx },
        )
    }

    /// Makes every `set_wire` on `wire` fail.
    pub fn fail_wire(&mut self, wire: u8) {
        self.failing_wires.insert(wire);
    }

    /// Makes every outbound message fail.
    pub fn set_link_down(&mut self) {
        self.link_down = true;
    }

    /// Makes `set_wire` report the change back through the listener.
    pub fn echo_wire_sets(&mut self) {
        self.echo_wire_sets = true;
    }

    /// Makes the next `readable` fail with an I/O error.
    pub fn fail_next_readable(&mut self) {
        self.fail_next_readable = true;
    }

    /// Pretends the device already asserts `wire`.
    pub fn assert_wire(&mut self, wire: u8, connect: bool) {
        self.asserted.insert(WireId::new(wire).unwrap(), connect);
    }

    pub fn sent(&self) -> &[DeviceMessage] {
        &self.sent
    }

    pub fn count_sent(&self, message: DeviceMessage) -> usize {
        self.sent.iter().filter(|m| **m == message).count()
    }

    fn dispatch(&mut self, frame: Frame, listener: &mut dyn DeviceListener) -> backplate_bridge::Result<()> {
        match frame {
            Frame::Log(text) => listener.on_log(&text),
            Frame::Weather {
                temperature,
                humidity,
            } => listener.on_weather(WeatherReading::from_raw(temperature, humidity)),
            Frame::Power(status) => listener.on_power_status(&status),
            Frame::WireAsserted { wire, connect } => {
                let wire = WireId::new(wire)?;
                self.asserted.insert(wire, connect);
                listener.on_wire_asserted(wire, connect);
            }
            Frame::ResetComplete(mask) => {
                listener.on_reset_complete(self, WireMask::from_bits(mask))?;
            }
        }
        Ok(())
    }
}

impl DeviceCommands for MockDevice {
    fn send(&mut self, message: DeviceMessage, _payload: &[u8]) -> Result<(), DeviceError> {
        if self.link_down {
            return Err(DeviceError::SendFailed {
                message: message.to_string(),
                reason: "link down".to_string(),
            });
        }
        self.sent.push(message);
        Ok(())
    }

    fn wire_asserted(&self, wire: WireId) -> Option<bool> {
        self.asserted.get(&wire).copied()
    }
}

impl DeviceSession for MockDevice {
    async fn readable(&mut self) -> Result<(), DeviceError> {
        if std::mem::take(&mut self.fail_next_readable) {
            return Err(DeviceError::Io(io::Error::new(io::ErrorKind::Interrupted, "poll interrupted")));
        }
        if self.pending.is_empty() {
            let frame = self.frames.recv().await.ok_or(DeviceError::Disconnected)?;
            self.pending.push_back(frame);
        }
        Ok(())
    }

    fn read(&mut self, listener: &mut dyn DeviceListener) -> backplate_bridge::Result<usize> {
        while let Ok(frame) = self.frames.try_recv() {
            self.pending.push_back(frame);
        }
        let mut count = 0;
        while let Some(frame) = self.pending.pop_front() {
            self.dispatch(frame, listener)?;
            count += 1;
        }
        Ok(count)
    }

    fn set_wire(&mut self, wire: WireId, connect: bool, listener: &mut dyn DeviceListener) -> bool {
        if self.failing_wires.contains(&wire.value()) {
            return false;
        }
        self.asserted.insert(wire, connect);
        if self.echo_wire_sets {
            listener.on_wire_asserted(wire, connect);
        }
        true
    }
}
