// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Listen command - print summaries as a downstream consumer sees them.

use std::net::{SocketAddr, UdpSocket};

use anyhow::Context as _;
use clap::Args;
use tracing::{debug, warn};

use crate::common::{format_time_mark, Result};
use spat_relay::j2735::MovementPhaseState;
use spat_relay::wire;

/// Receive versioned summaries and print one line per record.
#[derive(Args, Clone, Debug)]
pub struct ListenCmd {
    /// Address to bind
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:50000")]
    bind: SocketAddr,

    /// Stop after this many datagrams
    #[arg(short = 'n', long)]
    count: Option<u64>,
}

impl ListenCmd {
    pub fn run(self) -> Result<()> {
        let socket =
            UdpSocket::bind(self.bind).with_context(|| format!("cannot bind to {}", self.bind))?;
        eprintln!("Listening on {}...", self.bind);

        let mut buf = [0u8; 2048];
        let mut seen = 0u64;
        while self.count.map_or(true, |count| seen < count) {
            let (n, src) = match socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(e) => {
                    warn!(error = %e, "recv error");
                    continue;
                }
            };
            seen += 1;
            debug!(bytes = n, from = %src, "summary received");

            let records = match wire::decode_versioned(&buf[..n]) {
                Ok(records) => records,
                Err(e) => {
                    warn!(from = %src, "not a summary: {e}");
                    continue;
                }
            };
            for r in records {
                let state = MovementPhaseState::from_code(u32::from(r.record.event_state))
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| r.record.event_state.to_string());
                println!(
                    "[{}] id={} name={:?} group={} state={} min_end={}",
                    r.slot,
                    r.record.intersection_id,
                    r.record.movement_name.as_str(),
                    r.record.signal_group,
                    state,
                    format_time_mark(r.record.min_end_time)
                );
            }
        }
        Ok(())
    }
}
