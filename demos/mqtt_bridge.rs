// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Demo program: bridge a simulated backplate to an MQTT broker.
//!
//! The simulated backplate answers the reset, reports a weather and a power
//! sample on every refresh and accepts every wire change.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example mqtt_bridge -- <config.json>
//! ```
//!
//! # Example
//!
//! ```bash
//! cargo run --example mqtt_bridge -- bridge.json
//! mosquitto_sub -t 'fabd/nbp/events' &
//! mosquitto_pub -t 'fabd/nbp/events/subscription' -m "$(printf '\x01')"
//! mosquitto_pub -t 'fabd/nbp/control' -m '{"set_hvac_wire":[{"wire":2,"connect":true}]}'
//! ```

use std::env;

use backplate_bridge::device::{DeviceCommands, DeviceListener, DeviceMessage, DeviceSession};
use backplate_bridge::transport::mqtt::MqttTransport;
use backplate_bridge::types::{PowerStatus, WeatherReading, WireId, WireMask};
use backplate_bridge::{Bridge, BridgeConfig, DeviceError};

/// Wires the simulated backplate reports as present.
const PRESENT_WIRES: u16 = 0x003f;

/// In-process stand-in for a serial backplate.
#[derive(Debug, Default)]
struct SimulatedBackplate {
    wires: [Option<bool>; 16],
    reset_pending: bool,
    refresh_pending: bool,
    samples: u16,
}

impl DeviceCommands for SimulatedBackplate {
    fn send(&mut self, message: DeviceMessage, _payload: &[u8]) -> Result<(), DeviceError> {
        println!("-> backplate: {message}");
        match message {
            DeviceMessage::Reset => self.reset_pending = true,
            DeviceMessage::RequestPeriodic => self.refresh_pending = true,
        }
        Ok(())
    }

    fn wire_asserted(&self, wire: WireId) -> Option<bool> {
        self.wires[usize::from(wire.value())]
    }
}

impl DeviceSession for SimulatedBackplate {
    async fn readable(&mut self) -> Result<(), DeviceError> {
        if !self.reset_pending && !self.refresh_pending {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    fn read(&mut self, listener: &mut dyn DeviceListener) -> backplate_bridge::Result<usize> {
        let mut frames = 0;
        if std::mem::take(&mut self.reset_pending) {
            listener.on_log("reset");
            listener.on_reset_complete(self, WireMask::from_bits(PRESENT_WIRES))?;
            frames += 2;
        }
        if std::mem::take(&mut self.refresh_pending) {
            self.samples = self.samples.wrapping_add(1);
            listener.on_weather(WeatherReading::from_raw(2100 + self.samples % 50, 455));
            listener.on_power_status(&PowerStatus {
                flags: 0x40,
                vb_mv: 3805,
                ..PowerStatus::default()
            });
            frames += 2;
        }
        Ok(frames)
    }

    fn set_wire(&mut self, wire: WireId, connect: bool, _listener: &mut dyn DeviceListener) -> bool {
        println!("-> backplate: wire {wire} {}", if connect { "on" } else { "off" });
        self.wires[usize::from(wire.value())] = Some(connect);
        true
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --example mqtt_bridge -- bridge.json");
        std::process::exit(1);
    }

    let config = BridgeConfig::load(&args[1])?;
    let topics = config.topics();

    println!(
        "Connecting to MQTT broker {}:{}...",
        config.mqtt().host,
        config.mqtt().port
    );
    let (control, publisher) = MqttTransport::connect(&config).await?;

    println!("Bridging simulated backplate (in place of {})", config.device_path());
    println!("  control: {}", topics.control);
    println!("  events:  {}", topics.events);

    let mut bridge = Bridge::new(SimulatedBackplate::default(), control, publisher, &config);
    bridge.run().await?;

    Ok(())
}
