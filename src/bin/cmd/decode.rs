// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode command - decode one captured payload and show its summary.

use std::path::PathBuf;

use clap::Args;

use crate::common::{format_dsecond, format_moy_now, format_time_mark, read_input, Result};
use spat_relay::j2735::Spat;
use spat_relay::{MessageDecoder, RelayConfig, SignalTable, UperDecoder};

/// Decode a captured MessageFrame.
#[derive(Args, Clone, Debug)]
pub struct DecodeCmd {
    /// Payload file (raw bytes, or hex text with --hex)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Input is hex text
    #[arg(long)]
    hex: bool,

    /// Input is a full datagram; apply the frame gate first
    #[arg(long)]
    prefixed: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// TOML configuration for the gate and allow-list
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl DecodeCmd {
    pub fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => RelayConfig::load(path)?,
            None => RelayConfig::default(),
        };
        let bytes = read_input(&self.input, self.hex)?;
        let payload = if self.prefixed {
            config.gate().payload(&bytes)?
        } else {
            &bytes[..]
        };

        let decoder = UperDecoder::new();
        let frame = decoder.decode_frame(payload)?;
        let spat = decoder.decode_spat(&frame)?;
        let table = config.aggregator()?.summarize(&spat);

        if self.json {
            let assigned: Vec<_> = table
                .assigned()
                .map(|(slot, record)| serde_json::json!({ "slot": slot, "record": record }))
                .collect();
            let doc = serde_json::json!({
                "message_id": frame.message_id,
                "spat": spat,
                "table": assigned,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        } else {
            println!(
                "=== MessageFrame: id {} ({}) ===",
                frame.message_id,
                frame.message_name()
            );
            print_spat(&spat);
            println!();
            print_table(&table);
        }
        Ok(())
    }
}

fn print_spat(spat: &Spat) {
    if let Some(moy) = spat.time_stamp {
        println!("Time: {}", format_moy_now(moy));
    }
    if let Some(name) = &spat.name {
        println!("Name: {name}");
    }
    for intersection in &spat.intersections {
        println!();
        print!("Intersection {}", intersection.id.id);
        if let Some(region) = intersection.id.region {
            print!(" (region {region})");
        }
        if let Some(name) = &intersection.name {
            print!(" \"{name}\"");
        }
        println!(" rev {}", intersection.revision);
        println!("  Status: {:#06x}", intersection.status);
        if let Some(moy) = intersection.moy {
            print!("  Time: {}", format_moy_now(moy));
            if let Some(ms) = intersection.time_stamp {
                print!(" + {}", format_dsecond(ms));
            }
            println!();
        }
        for movement in &intersection.states {
            println!(
                "  Group {:>3} {}",
                movement.signal_group,
                movement.movement_name.as_deref().unwrap_or("-")
            );
            for event in &movement.state_time_speed {
                let end = event
                    .timing
                    .map(|t| format_time_mark(t.min_end_time))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "    {} {} until {}",
                    event.event_state.color(),
                    event.event_state,
                    end
                );
            }
        }
    }
}

fn print_table(table: &SignalTable) {
    println!("Signal table:");
    let mut any = false;
    for (slot, record) in table.assigned() {
        any = true;
        println!(
            "  [{slot}] id={} name={:?} group={} state={} min_end={}",
            record.intersection_id,
            record.movement_name.as_str(),
            record.signal_group,
            record.event_state,
            format_time_mark(record.min_end_time)
        );
    }
    if !any {
        println!("  (no tracked intersections)");
    }
}
