// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the bridge loop over in-memory channels.

mod common;

use std::time::Duration;

use backplate_bridge::codec;
use backplate_bridge::device::{DeviceCommands, DeviceMessage};
use backplate_bridge::event::OutboundEvent;
use backplate_bridge::transport::memory::{
    self, ControlClient, EventTap, MemoryControlChannel, MemoryPublisher,
};
use backplate_bridge::types::{Battery, PowerStatus, WeatherReading, WireChange, WireId};
use backplate_bridge::{Bridge, BridgeConfig, ControlRequest, Error, WireRequest};
use common::{Backplate, Frame, MockDevice};
use tokio::time::Instant;

type TestBridge = Bridge<MockDevice, MemoryControlChannel, MemoryPublisher>;

struct Harness {
    bridge: TestBridge,
    backplate: Backplate,
    client: ControlClient,
    tap: EventTap,
}

fn harness() -> Harness {
    let (device, backplate) = MockDevice::new();
    let (control, client) = memory::control_channel(8);
    let (publisher, tap) = memory::event_channel(32);
    let bridge = Bridge::new(device, control, publisher, &BridgeConfig::default());
    Harness {
        bridge,
        backplate,
        client,
        tap,
    }
}

/// Starts the bridge and completes the backplate reset.
async fn started() -> Harness {
    let mut h = harness();
    h.bridge.start().unwrap();
    h.backplate.reset_complete(0x003f);
    h.bridge.tick().await.unwrap();
    assert!(h.bridge.is_publishing());
    h
}

fn next_event(tap: &mut EventTap) -> OutboundEvent {
    let payload = tap.try_next_event().expect("expected a published event");
    codec::decode_event(&payload).unwrap()
}

fn wire(id: u8) -> WireId {
    WireId::new(id).unwrap()
}

// ============================================================================
// Startup
// ============================================================================

mod startup {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn reset_then_refresh_then_bind() {
        let mut h = harness();
        assert!(!h.bridge.is_publishing());

        h.bridge.start().unwrap();
        assert_eq!(h.bridge.device().sent(), &[DeviceMessage::Reset]);

        h.backplate.reset_complete(0x0001);
        h.bridge.tick().await.unwrap();

        // one request for the initial deadline, one for the reset
        assert_eq!(
            h.bridge.device().sent(),
            &[
                DeviceMessage::Reset,
                DeviceMessage::RequestPeriodic,
                DeviceMessage::RequestPeriodic
            ]
        );
        assert!(h.bridge.is_publishing());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_reset_completion_is_ignored() {
        let mut h = started().await;
        let deadline = h.bridge.next_refresh();

        tokio::time::advance(Duration::from_secs(3)).await;
        h.backplate.reset_complete(0xffff);
        h.bridge.tick().await.unwrap();

        assert_eq!(h.bridge.device().count_sent(DeviceMessage::RequestPeriodic), 2);
        assert_eq!(h.bridge.next_refresh(), deadline);
        assert_eq!(h.bridge.state().present_wires().unwrap().bits(), 0x003f);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_seeds_asserted_wires() {
        let mut h = harness();
        h.bridge.device_mut().assert_wire(1, true);
        h.bridge.device_mut().assert_wire(4, false);

        h.bridge.start().unwrap();
        h.backplate.reset_complete(0x0012);
        h.bridge.tick().await.unwrap();

        assert_eq!(h.bridge.state().wire(wire(1)), Some(true));
        assert_eq!(h.bridge.state().wire(wire(4)), Some(false));
        assert_eq!(h.bridge.state().wire(wire(2)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn events_before_reset_are_not_published() {
        let mut h = harness();
        h.bridge.start().unwrap();

        h.backplate.weather(1875, 402);
        h.bridge.tick().await.unwrap();

        assert!(h.tap.try_next_event().is_none());
        assert_eq!(
            h.bridge.state().weather(),
            Some(WeatherReading::from_raw(1875, 402))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reset_is_fatal() {
        let mut h = harness();
        h.bridge.device_mut().set_link_down();

        let err = h.bridge.start().unwrap_err();

        assert!(err.is_fatal());
        assert!(matches!(err, Error::Setup { stage: "reset backplate", .. }));
    }
}

// ============================================================================
// Periodic refresh
// ============================================================================

mod periodic_refresh {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_when_deadline_passes() {
        let mut h = started().await;
        let before = h.bridge.device().count_sent(DeviceMessage::RequestPeriodic);

        tokio::time::advance(Duration::from_secs(30)).await;
        let fired = Instant::now();
        h.bridge.tick().await.unwrap();

        assert_eq!(
            h.bridge.device().count_sent(DeviceMessage::RequestPeriodic),
            before + 1
        );
        assert_eq!(h.bridge.next_refresh(), fired + Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn next_deadline_counts_from_firing_time() {
        let mut h = started().await;
        let scheduled = h.bridge.next_refresh();

        tokio::time::advance(Duration::from_secs(47)).await;
        let fired = Instant::now();
        h.bridge.tick().await.unwrap();

        assert_eq!(h.bridge.next_refresh(), fired + Duration::from_secs(30));
        assert_ne!(h.bridge.next_refresh(), scheduled + Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_tick_waits_for_deadline() {
        let mut h = started().await;
        let deadline = h.bridge.next_refresh();
        let count = h.bridge.device().count_sent(DeviceMessage::RequestPeriodic);

        // nothing ready: the tick sleeps until the deadline and returns
        h.bridge.tick().await.unwrap();
        assert!(Instant::now() >= deadline);
        assert_eq!(h.bridge.device().count_sent(DeviceMessage::RequestPeriodic), count);

        h.bridge.tick().await.unwrap();
        assert_eq!(
            h.bridge.device().count_sent(DeviceMessage::RequestPeriodic),
            count + 1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn send_failure_still_reschedules() {
        let mut h = started().await;
        h.bridge.device_mut().set_link_down();

        tokio::time::advance(Duration::from_secs(30)).await;
        let fired = Instant::now();
        h.backplate.push(Frame::Log("still here".to_string()));
        h.bridge.tick().await.unwrap();

        assert_eq!(h.bridge.next_refresh(), fired + Duration::from_secs(30));
    }
}

// ============================================================================
// Device events
// ============================================================================

mod device_events {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn weather_is_published() {
        let mut h = started().await;

        h.backplate.weather(2150, 455);
        h.bridge.tick().await.unwrap();

        let payload = h.tap.try_next_event().unwrap();
        assert_eq!(payload, br#"{"weather":{"temperature":2150,"humidity":455}}"#);
        assert_eq!(
            h.bridge.state().weather(),
            Some(WeatherReading::from_raw(2150, 455))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn power_status_publishes_battery() {
        let mut h = started().await;

        h.backplate.push(Frame::Power(PowerStatus {
            flags: 0x40,
            vi_cv: 2412,
            vo_mv: 3700,
            vb_mv: 3805,
            ..PowerStatus::default()
        }));
        h.bridge.tick().await.unwrap();

        let event = next_event(&mut h.tap);
        assert_eq!(
            event.battery(),
            Some(&Battery {
                charging: false,
                voltage: 3805
            })
        );
        assert!(event.weather().is_none());
        assert!(event.wire_changes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn wire_assertion_is_published() {
        let mut h = started().await;

        h.backplate.push(Frame::WireAsserted {
            wire: 3,
            connect: true,
        });
        h.bridge.tick().await.unwrap();

        let event = next_event(&mut h.tap);
        assert_eq!(event.wire_changes(), &[WireChange::new(wire(3), true)]);
        assert_eq!(h.bridge.state().wire(wire(3)), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn log_lines_publish_nothing() {
        let mut h = started().await;

        h.backplate.push(Frame::Log("fet 3 on".to_string()));
        h.bridge.tick().await.unwrap();

        assert!(h.tap.try_next_event().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn frames_arriving_together_are_all_dispatched() {
        let mut h = started().await;

        h.backplate.weather(2000, 400);
        h.backplate.weather(2010, 410);
        h.backplate.weather(2020, 420);
        h.bridge.tick().await.unwrap();

        for _ in 0..3 {
            assert!(next_event(&mut h.tap).weather().is_some());
        }
        assert!(h.tap.try_next_event().is_none());
    }
}

// ============================================================================
// Subscription snapshots
// ============================================================================

mod snapshots {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ignored_notices_publish_nothing() {
        let mut h = started().await;

        h.tap.notify(Vec::new()).unwrap();
        h.tap.unsubscribe().unwrap();
        h.tap.notify(vec![0x00, b'a', b'b']).unwrap();
        for _ in 0..3 {
            h.bridge.tick().await.unwrap();
        }

        assert!(h.tap.try_next_event().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribe_without_data_publishes_empty_event() {
        let mut h = started().await;

        h.tap.subscribe().unwrap();
        h.bridge.tick().await.unwrap();

        let payload = h.tap.try_next_event().unwrap();
        assert_eq!(payload, b"{}");
    }

    #[tokio::test(start_paused = true)]
    async fn subscribe_with_topic_bytes_publishes_snapshot() {
        let mut h = started().await;

        h.tap.notify(vec![0x01, b'x']).unwrap();
        h.bridge.tick().await.unwrap();

        assert!(next_event(&mut h.tap).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_reports_latest_weather() {
        let mut h = started().await;

        h.backplate.weather(1000, 100);
        h.backplate.weather(2150, 455);
        h.bridge.tick().await.unwrap();
        while h.tap.try_next_event().is_some() {}

        h.tap.subscribe().unwrap();
        h.bridge.tick().await.unwrap();

        let event = next_event(&mut h.tap);
        assert_eq!(event.weather(), Some(&WeatherReading::from_raw(2150, 455)));
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_lists_observed_wires_in_order() {
        let mut h = started().await;

        h.backplate.push(Frame::WireAsserted {
            wire: 9,
            connect: true,
        });
        h.backplate.push(Frame::WireAsserted {
            wire: 1,
            connect: false,
        });
        h.backplate.push(Frame::WireAsserted {
            wire: 9,
            connect: false,
        });
        h.backplate.push(Frame::Power(PowerStatus {
            flags: 0x00,
            vb_mv: 3650,
            ..PowerStatus::default()
        }));
        h.bridge.tick().await.unwrap();
        while h.tap.try_next_event().is_some() {}

        h.tap.subscribe().unwrap();
        h.bridge.tick().await.unwrap();

        let event = next_event(&mut h.tap);
        assert_eq!(
            event.wire_changes(),
            &[
                WireChange::new(wire(1), false),
                WireChange::new(wire(9), false)
            ]
        );
        assert_eq!(
            event.battery(),
            Some(&Battery {
                charging: true,
                voltage: 3650
            })
        );
        assert!(event.weather().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_includes_wires_set_by_control() {
        let mut h = started().await;

        h.client.submit(control_requests::request(&[(2, true)])).unwrap();
        h.bridge.tick().await.unwrap();
        assert!(h.client.try_reply().is_some());

        h.tap.subscribe().unwrap();
        h.bridge.tick().await.unwrap();

        let event = next_event(&mut h.tap);
        assert_eq!(event.wire_changes(), &[WireChange::new(wire(2), true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_includes_wires_switched_by_device() {
        let mut h = started().await;
        h.bridge.device_mut().assert_wire(6, true);

        h.tap.subscribe().unwrap();
        h.bridge.tick().await.unwrap();

        let event = next_event(&mut h.tap);
        assert_eq!(event.wire_changes(), &[WireChange::new(wire(6), true)]);
        assert_eq!(h.bridge.state().wire(wire(6)), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn subscribe_before_reset_is_answered_once_bound() {
        let mut h = harness();
        h.bridge.start().unwrap();
        h.tap.subscribe().unwrap();

        // the weather event itself is dropped; the snapshot still carries it
        h.backplate.weather(2150, 455);
        h.backplate.reset_complete(0x0000);
        h.bridge.tick().await.unwrap();

        let event = next_event(&mut h.tap);
        assert_eq!(event.weather(), Some(&WeatherReading::from_raw(2150, 455)));
        assert!(h.tap.try_next_event().is_none());
    }
}

// ============================================================================
// Control requests
// ============================================================================

mod control_requests {
    use super::*;

    pub(super) fn request(items: &[(u8, bool)]) -> Vec<u8> {
        let items = items
            .iter()
            .map(|(id, connect)| WireRequest::new(u32::from(*id), *connect))
            .collect();
        codec::encode_request(&ControlRequest::new(items)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn failed_item_does_not_abort_batch() {
        let mut h = started().await;
        h.bridge.device_mut().fail_wire(5);

        h.client.submit(request(&[(2, true), (5, false)])).unwrap();
        h.bridge.tick().await.unwrap();

        let reply = codec::decode_reply(&h.client.try_reply().unwrap()).unwrap();
        assert_eq!(reply.results(), &[true, false]);
        assert_eq!(h.bridge.state().wire(wire(2)), Some(true));
        assert_eq!(h.bridge.state().wire(wire(5)), None);

        // request-driven sets are not published
        assert!(h.tap.try_next_event().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_wire_fails_only_its_item() {
        let mut h = started().await;

        h.client.submit(request(&[(2, true), (16, true)])).unwrap();
        h.bridge.tick().await.unwrap();

        let reply = codec::decode_reply(&h.client.try_reply().unwrap()).unwrap();
        assert_eq!(reply.results(), &[true, false]);
        assert_eq!(h.bridge.device().wire_asserted(wire(2)), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn wire_echoed_by_device_is_published() {
        let mut h = started().await;
        h.bridge.device_mut().echo_wire_sets();

        h.client.submit(request(&[(4, true)])).unwrap();
        h.bridge.tick().await.unwrap();

        let reply = codec::decode_reply(&h.client.try_reply().unwrap()).unwrap();
        assert_eq!(reply.results(), &[true]);
        let event = next_event(&mut h.tap);
        assert_eq!(event.wire_changes(), &[WireChange::new(wire(4), true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn reply_is_sent_when_every_item_fails() {
        let mut h = started().await;
        h.bridge.device_mut().fail_wire(0);
        h.bridge.device_mut().fail_wire(1);

        h.client.submit(request(&[(0, true), (1, true), (0, false)])).unwrap();
        h.bridge.tick().await.unwrap();

        let reply = codec::decode_reply(&h.client.try_reply().unwrap()).unwrap();
        assert_eq!(reply.results(), &[false, false, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_request_gets_empty_reply() {
        let mut h = started().await;

        h.client.submit(b"{}".to_vec()).unwrap();
        h.bridge.tick().await.unwrap();

        let reply = codec::decode_reply(&h.client.try_reply().unwrap()).unwrap();
        assert!(reply.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn undecodable_request_is_dropped() {
        let mut h = started().await;

        h.client.submit(b"\x08\x02\x10\x01".to_vec()).unwrap();
        h.bridge.tick().await.unwrap();
        assert!(h.client.try_reply().is_none());

        h.client.submit(request(&[(7, true)])).unwrap();
        h.bridge.tick().await.unwrap();
        let reply = codec::decode_reply(&h.client.try_reply().unwrap()).unwrap();
        assert_eq!(reply.results(), &[true]);
    }

    #[tokio::test(start_paused = true)]
    async fn requests_are_served_before_reset() {
        let mut h = harness();
        h.bridge.start().unwrap();

        h.client.submit(request(&[(2, true)])).unwrap();
        h.bridge.tick().await.unwrap();

        let reply = codec::decode_reply(&h.client.try_reply().unwrap()).unwrap();
        assert_eq!(reply.results(), &[true]);
        assert!(h.tap.try_next_event().is_none());
    }
}

// ============================================================================
// Poll errors
// ============================================================================

mod poll_errors {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn device_poll_error_still_services_device() {
        let mut h = started().await;
        h.bridge.device_mut().fail_next_readable();

        h.backplate.weather(2150, 455);
        h.bridge.tick().await.unwrap();

        let event = next_event(&mut h.tap);
        assert_eq!(event.weather(), Some(&WeatherReading::from_raw(2150, 455)));
    }

    #[tokio::test(start_paused = true)]
    async fn device_poll_error_still_answers_queued_request() {
        let mut h = started().await;
        h.bridge.device_mut().fail_next_readable();

        h.client.submit(control_requests::request(&[(3, true)])).unwrap();
        h.bridge.tick().await.unwrap();

        let reply = codec::decode_reply(&h.client.try_reply().unwrap()).unwrap();
        assert_eq!(reply.results(), &[true]);
        assert_eq!(h.bridge.state().wire(wire(3)), Some(true));
    }
}

// ============================================================================
// Shutdown
// ============================================================================

mod shutdown {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn lost_device_link_is_fatal() {
        let Harness {
            mut bridge,
            backplate,
            client: _client,
            tap: _tap,
        } = started().await;
        drop(backplate);

        let err = bridge.tick().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_control_channel_is_fatal() {
        let Harness {
            mut bridge,
            backplate: _backplate,
            client,
            tap: _tap,
        } = started().await;
        drop(client);

        let err = bridge.tick().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn run_returns_only_on_fatal_error() {
        let (device, backplate) = MockDevice::new();
        let (control, _client) = memory::control_channel(8);
        let (publisher, _tap) = memory::event_channel(8);
        let mut bridge = Bridge::new(device, control, publisher, &BridgeConfig::default());

        backplate.reset_complete(0x0001);
        backplate.weather(2150, 455);
        drop(backplate);

        let err = bridge.run().await.unwrap_err();

        assert!(err.is_fatal());
        assert!(bridge.is_publishing());
        assert_eq!(bridge.device().sent()[0], DeviceMessage::Reset);
    }
}
