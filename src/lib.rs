// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # spat-relay
//!
//! SAE J2735 SPAT decoder and signal-state relay.
//!
//! Roadside units broadcast Signal Phase and Timing messages as UPER-encoded
//! `MessageFrame`s behind a fixed vendor prefix. The relay receives them over
//! UDP, keeps the current phase of one signal group per tracked intersection,
//! and forwards a compact summary to a downstream consumer.
//!
//! ## Architecture
//!
//! - `core/` - Error taxonomy and shared identifiers
//! - `encoding/` - Unaligned PER primitives and the [`MessageDecoder`] interface
//! - `j2735/` - Typed SPAT message tree with UPER decode and encode
//! - `frame` - Structural gate on inbound datagrams
//! - `aggregate/` - Allow-list, signal table and the aggregation walk
//! - `wire` - Outbound summary encodings
//! - `config` - TOML relay configuration
//! - `relay/` - The UDP service loop
//!
//! ## Example: Summarizing a payload
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use spat_relay::{Aggregator, MessageDecoder, UperDecoder};
//!
//! let payload = std::fs::read("spat.uper")?;
//! let spat = UperDecoder::new().decode(&payload)?;
//! let table = Aggregator::default().summarize(&spat);
//! for (slot, record) in table.assigned() {
//!     println!("{slot}: {} {}", record.intersection_id, record.event_state);
//! }
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use core::{MatchScope, Result, SpatError, WireFormat};

// Encoding/decoding
pub mod encoding;

pub use encoding::{MessageDecoder, UperDecoder};

// Message model
pub mod j2735;

// Pipeline stages
pub mod aggregate;
pub mod frame;
pub mod wire;

pub use aggregate::{Aggregator, AllowList, SignalRecord, SignalTable, TrackedIntersection};
pub use frame::{FrameConfig, FrameError, FrameGate};

// Service
pub mod config;
pub mod relay;

pub use config::RelayConfig;
pub use relay::{Relay, RelayStats};
