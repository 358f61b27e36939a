// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::net::UdpSocket;
use std::path::PathBuf;
use std::time::Duration;

use spat_relay::encoding::uper::UperWriter;
use spat_relay::j2735::{
    IntersectionReferenceId, IntersectionState, MessageFrame, MovementEvent, MovementPhaseState,
    MovementState, Spat, TimeChangeDetails, UperMessage, SPAT_MESSAGE_ID,
};
use spat_relay::{FrameGate, Relay, RelayConfig, UperDecoder};

// ============================================================================
// Captured Data
// ============================================================================

/// MessageFrame captured from a roadside unit: one intersection (404) with
/// eight movements.
pub const REFERENCE_FRAME: [u8; 130] = [
    0x00, 0x13, 0x7f, 0x00, 0x18, 0x80, 0xca, 0x00, 0xca, 0x01, 0x04, 0x00, 0x26, 0x64, 0xa8, 0xbb,
    0xd0, 0x76, 0x1e, 0x9d, 0x4a, 0x50, 0x64, 0xc7, 0x91, 0x50, 0x04, 0x11, 0x40, 0x04, 0x60, 0x01,
    0x00, 0x18, 0x39, 0x91, 0x63, 0x54, 0x02, 0x04, 0x30, 0x01, 0x27, 0x00, 0x40, 0x06, 0x1e, 0x9d,
    0x4a, 0x50, 0x64, 0xc7, 0x91, 0x50, 0x0c, 0x10, 0xc0, 0x09, 0x4c, 0x01, 0x00, 0x18, 0x39, 0x91,
    0x63, 0x54, 0x04, 0x04, 0x30, 0x02, 0x53, 0x00, 0x40, 0x06, 0x1e, 0x9d, 0x4a, 0x50, 0x64, 0xc7,
    0x91, 0x50, 0x14, 0x11, 0x40, 0x04, 0x60, 0x01, 0x00, 0x18, 0x39, 0x91, 0x63, 0x54, 0x06, 0x04,
    0x30, 0x01, 0x27, 0x00, 0x40, 0x06, 0x1e, 0x9d, 0x4a, 0x50, 0x64, 0xc7, 0x91, 0x50, 0x1c, 0x10,
    0xc0, 0x06, 0xcc, 0x01, 0x00, 0x18, 0x39, 0x91, 0x63, 0x54, 0x08, 0x04, 0x30, 0x01, 0xb3, 0x00,
    0x40, 0x00,
];

/// Per-movement (signal group, name, phase code, minEndTime) of [`REFERENCE_FRAME`].
pub const REFERENCE_MOVEMENTS: [(u8, &str, u8, u16); 8] = [
    (1, "STRAIGHT", 5, 560),
    (2, "LEFT", 3, 590),
    (3, "STRAIGHT", 3, 1190),
    (4, "LEFT", 3, 1190),
    (5, "STRAIGHT", 5, 560),
    (6, "LEFT", 3, 590),
    (7, "STRAIGHT", 3, 870),
    (8, "LEFT", 3, 870),
];

/// [`REFERENCE_FRAME`] behind a zeroed 16-byte prefix.
pub fn reference_datagram() -> Vec<u8> {
    FrameGate::default().wrap(&REFERENCE_FRAME)
}

/// Get the path to a test fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir)
        .join("tests")
        .join("fixtures")
        .join(name)
}

// ============================================================================
// SPAT Builders
// ============================================================================

pub fn event(state: MovementPhaseState, min_end_time: u16) -> MovementEvent {
    MovementEvent {
        event_state: state,
        timing: Some(TimeChangeDetails {
            min_end_time,
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn movement(name: &str, group: u8, events: Vec<MovementEvent>) -> MovementState {
    MovementState {
        movement_name: Some(name.to_string()),
        signal_group: group,
        state_time_speed: events,
        ..Default::default()
    }
}

pub fn intersection(id: u16, states: Vec<MovementState>) -> IntersectionState {
    IntersectionState {
        id: IntersectionReferenceId { region: None, id },
        revision: 1,
        states,
        ..Default::default()
    }
}

pub fn spat(intersections: Vec<IntersectionState>) -> Spat {
    Spat {
        intersections,
        ..Default::default()
    }
}

/// Encode a SPAT as a datagram that passes the default gate.
pub fn datagram(spat: &Spat) -> Vec<u8> {
    let frame = MessageFrame::from_spat(spat)
        .and_then(|f| f.to_uper())
        .expect("encode SPAT");
    FrameGate::default().wrap(&frame)
}

/// Hand-encode a SPAT with one intersection, one unnamed movement and one
/// event, so tests can place arbitrary bits where the encoder never would.
///
/// `write_event` writes the complete MovementEvent. `write_extensions`, when
/// given, sets the IntersectionState extension bit and writes the additions
/// that follow its root components.
pub fn hand_encoded_datagram(
    intersection_id: u16,
    signal_group: u8,
    write_event: impl FnOnce(&mut UperWriter),
    write_extensions: Option<&dyn Fn(&mut UperWriter)>,
) -> Vec<u8> {
    let mut w = UperWriter::new();
    // SPAT: no extensions, no optional fields, one intersection
    w.write_bits(0b0000, 4);
    w.write_bits(0, 5);
    // IntersectionState
    w.write_bit(write_extensions.is_some());
    w.write_bits(0, 6);
    IntersectionReferenceId {
        region: None,
        id: intersection_id,
    }
    .encode_uper(&mut w)
    .expect("encode id");
    w.write_bits(1, 7); // revision
    w.write_bits(0, 16); // status
    w.write_bits(0, 8); // one movement
    // MovementState: no extensions, no optional fields
    w.write_bits(0b0000, 4);
    w.write_bits(u64::from(signal_group), 8);
    w.write_bits(0, 4); // one event
    write_event(&mut w);
    if let Some(extensions) = write_extensions {
        extensions(&mut w);
    }
    let frame = MessageFrame::new(SPAT_MESSAGE_ID, w.into_bytes())
        .to_uper()
        .expect("encode frame");
    FrameGate::default().wrap(&frame)
}

/// Write a MovementEvent carrying timing and one advisory speed whose
/// `AdvisorySpeedType` is the given extension index (normally small form).
pub fn write_event_with_speed_extension(w: &mut UperWriter, min_end_time: u16, extension: u64) {
    w.write_bit(false); // no extensions
    w.write_bits(0b110, 3); // timing, speeds
    w.write_bits(3, 4); // stop-And-Remain
    w.write_bits(0, 5); // TimeChangeDetails presence
    w.write_bits(u64::from(min_end_time), 16);
    w.write_bits(0, 4); // one advisory speed
    w.write_bit(false); // AdvisorySpeed extension bit
    w.write_bits(0, 5); // AdvisorySpeed presence
    w.write_bit(true); // AdvisorySpeedType beyond the root
    if extension < 64 {
        w.write_bit(false);
        w.write_bits(extension, 6);
    } else {
        w.write_bit(true);
        w.write_length(8).expect("length");
        w.write_bits(extension, 64);
    }
}

// ============================================================================
// Loopback Relay
// ============================================================================

/// Relay on loopback sockets plus the consumer socket it forwards to.
pub struct Loopback {
    pub relay: Relay,
    pub consumer: UdpSocket,
}

impl Loopback {
    pub fn new(config: RelayConfig) -> Self {
        let consumer = UdpSocket::bind("127.0.0.1:0").unwrap();
        consumer
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let config = RelayConfig {
            forward_to: consumer.local_addr().unwrap(),
            receive_timeout_ms: Some(50),
            ..config
        };
        let listen = UdpSocket::bind("127.0.0.1:0").unwrap();
        let forward = UdpSocket::bind("127.0.0.1:0").unwrap();
        let relay = Relay::from_sockets(listen, forward, &config, UperDecoder::new()).unwrap();
        Self { relay, consumer }
    }

    /// Send datagrams to the relay from a fresh socket.
    pub fn send(&self, datagrams: &[Vec<u8>]) {
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        let target = self.relay.local_addr().unwrap();
        for d in datagrams {
            sender.send_to(d, target).unwrap();
        }
    }

    /// Receive one forwarded summary.
    pub fn recv(&self) -> Vec<u8> {
        let mut buf = [0u8; 2048];
        let (n, _) = self.consumer.recv_from(&mut buf).unwrap();
        buf[..n].to_vec()
    }
}

impl Default for Loopback {
    fn default() -> Self {
        Self::new(RelayConfig::default())
    }
}
