// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # spat-relay CLI
//!
//! Relay SPAT traffic and inspect captured frames.
//!
//! ## Usage
//!
//! ```sh
//! # Run the relay with the reference addresses
//! spat-relay run
//!
//! # Run with a config file, overriding the consumer
//! spat-relay run --config relay.toml --forward-to 127.0.0.1:50001
//!
//! # Decode a captured frame
//! spat-relay decode capture.hex --hex
//!
//! # Replay a capture and watch the summaries
//! spat-relay listen --bind 127.0.0.1:50000 &
//! spat-relay send capture.hex --hex --to 192.168.1.3:60000
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{DecodeCmd, ListenCmd, RunCmd, SendCmd};
use common::Result;

/// spat-relay - SAE J2735 SPAT decoder and signal-state relay
#[derive(Parser, Clone)]
#[command(name = "spat-relay")]
#[command(about = "SAE J2735 SPAT decoder and signal-state relay", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Log filter, e.g. "debug" or "spat_relay=trace" (defaults to RUST_LOG, then info)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Receive SPAT datagrams and forward signal summaries
    Run(RunCmd),

    /// Decode a captured MessageFrame and show its signal table
    Decode(DecodeCmd),

    /// Print summaries received from a relay
    Listen(ListenCmd),

    /// Send a captured MessageFrame behind a zeroed prefix
    Send(SendCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    common::init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Run(cmd) => cmd.run(),
        Commands::Decode(cmd) => cmd.run(),
        Commands::Listen(cmd) => cmd.run(),
        Commands::Send(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
