// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! SAE J2735 message subset.
//!
//! Only what the relay needs from the DSRC schema is modelled here:
//! the outer [`MessageFrame`] envelope and the Signal Phase and Timing
//! message tree rooted at [`Spat`].
//!
//! # Example
//!
//! ```
//! use spat_relay::j2735::{MessageFrame, SPAT_MESSAGE_ID};
//!
//! let frame = MessageFrame::new(SPAT_MESSAGE_ID, Vec::new());
//! assert!(frame.is_spat());
//! assert_eq!(frame.message_name(), "SPAT");
//! ```

pub mod phase;
pub mod spat;
pub mod uper;

use serde::{Deserialize, Serialize};

pub use phase::{MovementPhaseState, SignalColor};
pub use spat::{
    AdvisorySpeed, ConnectionManeuverAssist, IntersectionReferenceId, IntersectionState,
    MovementEvent, MovementState, RegionalExtension, Spat, TimeChangeDetails,
    MINUTE_OF_YEAR_UNKNOWN, TIME_MARK_UNKNOWN,
};
pub use uper::UperMessage;

/// `DSRCmsgID` of MapData.
pub const MAP_DATA_MESSAGE_ID: u16 = 18;
/// `DSRCmsgID` of SPAT (`signalPhaseAndTimingMessage`).
pub const SPAT_MESSAGE_ID: u16 = 19;
/// `DSRCmsgID` of BasicSafetyMessage.
pub const BSM_MESSAGE_ID: u16 = 20;

/// Outer envelope carrying a message ID and the still-encoded message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageFrame {
    /// DSRC message ID (0..=32767)
    pub message_id: u16,
    /// UPER encoding of the message selected by `message_id`
    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
}

impl MessageFrame {
    /// Create a frame around an encoded message.
    pub fn new(message_id: u16, value: Vec<u8>) -> Self {
        Self { message_id, value }
    }

    /// Wrap a SPAT message.
    pub fn from_spat(spat: &Spat) -> crate::Result<Self> {
        Ok(Self::new(SPAT_MESSAGE_ID, spat.to_uper()?))
    }

    /// Check if the frame carries a SPAT message.
    pub fn is_spat(&self) -> bool {
        self.message_id == SPAT_MESSAGE_ID
    }

    /// Short name of the carried message type.
    pub fn message_name(&self) -> &'static str {
        match self.message_id {
            MAP_DATA_MESSAGE_ID => "MapData",
            SPAT_MESSAGE_ID => "SPAT",
            BSM_MESSAGE_ID => "BSM",
            _ => "unknown",
        }
    }
}

pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
