// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! UDP relay service.
//!
//! One thread, one datagram at a time: receive, gate, decode, aggregate,
//! encode, forward, then reset the table. Nothing from one cycle survives
//! into the next.
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use spat_relay::{Relay, RelayConfig, UperDecoder};
//!
//! let config = RelayConfig::load("relay.toml")?;
//! let mut relay = Relay::bind(&config, UperDecoder::new())?;
//! relay.run();
//! # }
//! ```

mod stats;

pub use stats::RelayStats;

use std::io;
use std::net::{SocketAddr, UdpSocket};

use tracing::{debug, info, trace, warn};

use crate::aggregate::{Aggregator, SignalTable};
use crate::config::RelayConfig;
use crate::core::WireFormat;
use crate::encoding::{MessageDecoder, UperDecoder};
use crate::frame::FrameGate;
use crate::wire;
use crate::{Result, SpatError};

/// SPAT relay bound to a listen socket and a forward socket.
pub struct Relay<D: MessageDecoder = UperDecoder> {
    listen: UdpSocket,
    forward: UdpSocket,
    forward_to: SocketAddr,
    gate: FrameGate,
    decoder: D,
    aggregator: Aggregator,
    table: SignalTable,
    format: WireFormat,
    max_datagram: usize,
    stats: RelayStats,
}

impl<D: MessageDecoder> Relay<D> {
    /// Bind the listen and forward sockets described by `config`.
    pub fn bind(config: &RelayConfig, decoder: D) -> Result<Self> {
        config.validate()?;
        let listen = UdpSocket::bind(config.listen)
            .map_err(|e| SpatError::transport(format!("bind {}: {e}", config.listen)))?;
        let forward = UdpSocket::bind(config.source)
            .map_err(|e| SpatError::transport(format!("bind {}: {e}", config.source)))?;
        Self::from_sockets(listen, forward, config, decoder)
    }

    /// Build a relay around existing sockets (for testing).
    ///
    /// Addresses in `config` other than `forward_to` are ignored.
    pub fn from_sockets(
        listen: UdpSocket,
        forward: UdpSocket,
        config: &RelayConfig,
        decoder: D,
    ) -> Result<Self> {
        listen.set_read_timeout(config.receive_timeout())?;
        let aggregator = config.aggregator()?;
        let table = aggregator.empty_table();
        info!(
            listen = %listen.local_addr()?,
            forward_to = %config.forward_to,
            tracked = aggregator.allow_list().len(),
            scope = aggregator.scope().as_str(),
            format = config.wire.format.as_str(),
            "relay ready"
        );
        Ok(Self {
            listen,
            forward,
            forward_to: config.forward_to,
            gate: config.gate(),
            decoder,
            aggregator,
            table,
            format: config.wire.format,
            max_datagram: config.frame.max_datagram,
            stats: RelayStats::default(),
        })
    }

    /// Address the relay receives on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listen.local_addr()?)
    }

    /// Counters so far.
    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Current table; always empty between cycles.
    pub fn table(&self) -> &SignalTable {
        &self.table
    }

    /// Run one cycle over a datagram and return the summary to forward.
    ///
    /// `Ok(None)` means the frame gate dropped the datagram. Decode failures
    /// are returned as errors. The table is reset before returning either way.
    pub fn process(&mut self, datagram: &[u8]) -> Result<Option<Vec<u8>>> {
        self.stats.received += 1;
        let result = self.cycle(datagram);
        self.table.reset();
        match &result {
            Ok(Some(_)) => {}
            Ok(None) => self.stats.gated += 1,
            Err(_) => self.stats.decode_failed += 1,
        }
        result
    }

    fn cycle(&mut self, datagram: &[u8]) -> Result<Option<Vec<u8>>> {
        let payload = match self.gate.payload(datagram) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(bytes = datagram.len(), reason = %e, "datagram gated");
                return Ok(None);
            }
        };
        let spat = self.decoder.decode(payload)?;
        trace!(?spat, "decoded tree");
        self.aggregator.aggregate(&spat, &mut self.table);
        let summary = wire::encode(self.format, &self.table, self.aggregator.allow_list())?;
        Ok(Some(summary))
    }

    /// Process a datagram and forward its summary, logging any failure.
    pub fn handle_datagram(&mut self, datagram: &[u8]) {
        match self.process(datagram) {
            Ok(Some(summary)) => self.send_summary(&summary),
            Ok(None) => {}
            Err(e) => warn!(fields = %e.log_line(), "dropping datagram: {e}"),
        }
    }

    fn send_summary(&mut self, summary: &[u8]) {
        match self.forward.send_to(summary, self.forward_to) {
            Ok(n) => {
                self.stats.forwarded += 1;
                debug!(bytes = n, to = %self.forward_to, "sent summary");
            }
            Err(e) => {
                self.stats.send_failed += 1;
                warn!(to = %self.forward_to, error = %e, "send failed");
            }
        }
    }

    /// Wait for one datagram and handle it.
    ///
    /// Returns `Ok(false)` when the receive timed out.
    pub fn poll(&mut self, buf: &mut [u8]) -> Result<bool> {
        let (n, src) = match self.listen.recv_from(buf) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        debug!(bytes = n, from = %src, "recv data");
        if n == buf.len() {
            warn!(bytes = n, "datagram fills the receive buffer and may be truncated");
        }
        self.handle_datagram(&buf[..n]);
        Ok(true)
    }

    /// Relay forever.
    pub fn run(&mut self) -> ! {
        let mut buf = vec![0u8; self.max_datagram];
        loop {
            if let Err(e) = self.poll(&mut buf) {
                warn!(fields = %e.log_line(), "receive failed: {e}");
            }
        }
    }

    /// Relay until `count` datagrams have been received.
    pub fn run_for(&mut self, count: u64) -> RelayStats {
        let mut buf = vec![0u8; self.max_datagram];
        let mut seen = 0;
        while seen < count {
            match self.poll(&mut buf) {
                Ok(true) => seen += 1,
                Ok(false) => {}
                Err(e) => warn!(fields = %e.log_line(), "receive failed: {e}"),
            }
        }
        info!(
            received = self.stats.received,
            gated = self.stats.gated,
            decode_failed = self.stats.decode_failed,
            forwarded = self.stats.forwarded,
            send_failed = self.stats.send_failed,
            "relay stopped"
        );
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::j2735::{
        IntersectionReferenceId, IntersectionState, MessageFrame, MovementEvent,
        MovementPhaseState, MovementState, Spat, TimeChangeDetails, UperMessage,
    };

    fn spat_for(id: u16, group: u8, state: MovementPhaseState, min_end: u16) -> Spat {
        Spat {
            intersections: vec![IntersectionState {
                id: IntersectionReferenceId { region: None, id },
                revision: 1,
                states: vec![MovementState {
                    movement_name: Some("2A".into()),
                    signal_group: group,
                    state_time_speed: vec![MovementEvent {
                        event_state: state,
                        timing: Some(TimeChangeDetails {
                            min_end_time: min_end,
                            ..Default::default()
                        }),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn datagram(spat: &Spat) -> Vec<u8> {
        let frame = MessageFrame::from_spat(spat).unwrap().to_uper().unwrap();
        FrameGate::default().wrap(&frame)
    }

    fn loopback_relay() -> (Relay, UdpSocket) {
        let consumer = UdpSocket::bind("127.0.0.1:0").unwrap();
        consumer
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let config = RelayConfig {
            forward_to: consumer.local_addr().unwrap(),
            receive_timeout_ms: Some(50),
            ..Default::default()
        };
        let listen = UdpSocket::bind("127.0.0.1:0").unwrap();
        let forward = UdpSocket::bind("127.0.0.1:0").unwrap();
        let relay = Relay::from_sockets(listen, forward, &config, UperDecoder::new()).unwrap();
        (relay, consumer)
    }

    #[test]
    fn test_process_tracked_intersection() {
        let (mut relay, _consumer) = loopback_relay();
        let d = datagram(&spat_for(400, 2, MovementPhaseState::StopAndRemain, 120));
        let summary = relay.process(&d).unwrap().unwrap();

        let records = wire::decode_versioned(&summary).unwrap();
        assert_eq!(records[2].record.intersection_id, 400);
        assert_eq!(records[2].record.event_state, 3);
        assert_eq!(records[2].record.min_end_time, 120);
        assert!(relay.table().is_empty());
    }

    #[test]
    fn test_gate_rejection_leaves_no_trace() {
        let (mut relay, _consumer) = loopback_relay();
        let mut d = datagram(&spat_for(400, 2, MovementPhaseState::StopAndRemain, 120));
        d[17] = 0x14;
        assert_eq!(relay.process(&d).unwrap(), None);
        assert!(relay.table().is_empty());
        assert_eq!(relay.stats().gated, 1);
        assert_eq!(relay.stats().forwarded, 0);
    }

    #[test]
    fn test_decode_failure_short_circuits() {
        let (mut relay, _consumer) = loopback_relay();
        // tag passes, payload is a truncated frame
        let mut d = vec![0u8; 19];
        d[17] = 0x13;
        d[18] = 0x40;
        assert!(relay.process(&d).is_err());
        assert!(relay.table().is_empty());
        assert_eq!(relay.stats().decode_failed, 1);
    }

    #[test]
    fn test_repeat_input_same_output() {
        let (mut relay, _consumer) = loopback_relay();
        let d = datagram(&spat_for(700, 8, MovementPhaseState::ProtectedMovementAllowed, 9));
        let first = relay.process(&d).unwrap();
        let second = relay.process(&d).unwrap();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_for_forwards_summary() {
        let (mut relay, consumer) = loopback_relay();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        let target = relay.local_addr().unwrap();
        sender
            .send_to(
                &datagram(&spat_for(200, 1, MovementPhaseState::PermissiveMovementAllowed, 5)),
                target,
            )
            .unwrap();
        sender.send_to(&[0u8; 4], target).unwrap();

        let stats = relay.run_for(2);
        assert_eq!(stats.received, 2);
        assert_eq!(stats.forwarded, 1);
        assert_eq!(stats.gated, 1);

        let mut buf = [0u8; 256];
        let (n, _) = consumer.recv_from(&mut buf).unwrap();
        let records = wire::decode_versioned(&buf[..n]).unwrap();
        assert_eq!(records[0].record.intersection_id, 200);
        assert_eq!(records[0].record.event_state, 5);
    }

    #[test]
    fn test_poll_timeout_is_not_an_error() {
        let (mut relay, _consumer) = loopback_relay();
        let mut buf = [0u8; 64];
        assert!(!relay.poll(&mut buf).unwrap());
        assert_eq!(relay.stats().received, 0);
    }
}
