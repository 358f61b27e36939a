// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Send command - replay a captured MessageFrame as a roadside unit would.

use std::net::{SocketAddr, UdpSocket};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;

use crate::common::{read_input, Result};
use spat_relay::frame::DEFAULT_PREFIX_LEN;
use spat_relay::{FrameConfig, FrameGate};

/// Wrap a MessageFrame in a zeroed prefix and send it.
#[derive(Args, Clone, Debug)]
pub struct SendCmd {
    /// MessageFrame file (raw bytes, or hex text with --hex)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Destination address
    #[arg(long, value_name = "ADDR")]
    to: SocketAddr,

    /// Input is hex text
    #[arg(long)]
    hex: bool,

    /// Zero bytes placed before the frame
    #[arg(long, default_value_t = DEFAULT_PREFIX_LEN)]
    prefix_len: usize,

    /// How many times to send
    #[arg(long, default_value_t = 1)]
    repeat: u32,
}

impl SendCmd {
    pub fn run(self) -> Result<()> {
        let frame = read_input(&self.input, self.hex)?;
        let gate = FrameGate::new(&FrameConfig {
            prefix_len: self.prefix_len,
            ..Default::default()
        });
        let datagram = gate.wrap(&frame);

        let socket = UdpSocket::bind("0.0.0.0:0").context("cannot open send socket")?;
        for _ in 0..self.repeat {
            let n = socket
                .send_to(&datagram, self.to)
                .with_context(|| format!("sending to {}", self.to))?;
            println!("sent {n} bytes to {}", self.to);
        }
        Ok(())
    }
}
