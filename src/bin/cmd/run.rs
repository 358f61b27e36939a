// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Run command - the relay loop.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::common::Result;
use spat_relay::{MatchScope, Relay, RelayConfig, UperDecoder, WireFormat};

/// Receive SPAT datagrams and forward signal summaries.
#[derive(Args, Clone, Debug)]
pub struct RunCmd {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to receive SPAT datagrams on
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Downstream consumer address
    #[arg(long, value_name = "ADDR")]
    forward_to: Option<SocketAddr>,

    /// Local address of the forward socket
    #[arg(long, value_name = "ADDR")]
    source: Option<SocketAddr>,

    /// Summary encoding (versioned, legacy)
    #[arg(long)]
    format: Option<WireFormat>,

    /// Tracked slot eligibility (intersection, cycle)
    #[arg(long)]
    scope: Option<MatchScope>,

    /// Stop after this many datagrams
    #[arg(short = 'n', long)]
    count: Option<u64>,
}

impl RunCmd {
    pub fn run(self) -> Result<()> {
        let mut config = match &self.config {
            Some(path) => RelayConfig::load(path)?,
            None => RelayConfig::default(),
        };
        if let Some(addr) = self.listen {
            config.listen = addr;
        }
        if let Some(addr) = self.forward_to {
            config.forward_to = addr;
        }
        if let Some(addr) = self.source {
            config.source = addr;
        }
        if let Some(format) = self.format {
            config.wire.format = format;
        }
        if let Some(scope) = self.scope {
            config.aggregate.match_scope = scope;
        }

        let mut relay = Relay::bind(&config, UperDecoder::new())?;
        match self.count {
            Some(count) => {
                let stats = relay.run_for(count);
                println!("{stats}");
                Ok(())
            }
            None => {
                info!("relaying until interrupted");
                relay.run()
            }
        }
    }
}
