// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Relay counters.

use std::fmt;

use serde::Serialize;

/// Per-relay datagram counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    /// Datagrams handed to the pipeline
    pub received: u64,
    /// Dropped by the frame gate
    pub gated: u64,
    /// Dropped because decoding or encoding failed
    pub decode_failed: u64,
    /// Summaries sent downstream
    pub forwarded: u64,
    /// Summaries the socket refused
    pub send_failed: u64,
}

impl RelayStats {
    /// Datagrams that produced no summary.
    pub fn dropped(&self) -> u64 {
        self.gated + self.decode_failed
    }
}

impl fmt::Display for RelayStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={} gated={} decode_failed={} forwarded={} send_failed={}",
            self.received, self.gated, self.decode_failed, self.forwarded, self.send_failed
        )
    }
}
