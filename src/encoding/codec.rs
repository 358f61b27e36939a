// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message decoder interface used by the relay.
//!
//! The relay never looks at encoded bytes itself: it hands the payload to a
//! [`MessageDecoder`], which either yields a typed message tree or fails.
//! A failure always ends the current cycle before aggregation.
//!
//! ## Example
//!
//! ```
//! use spat_relay::encoding::{MessageDecoder, UperDecoder};
//!
//! let decoder = UperDecoder::new();
//! assert!(decoder.decode_frame(&[]).is_err());
//! ```

use tracing::{debug, trace};

use crate::j2735::{MessageFrame, Spat, UperMessage};
use crate::{Result, SpatError};

/// Decodes raw payloads into J2735 messages.
pub trait MessageDecoder: Send + Sync {
    /// Decode the outer `MessageFrame` envelope.
    fn decode_frame(&self, payload: &[u8]) -> Result<MessageFrame>;

    /// Decode the SPAT carried by a frame.
    ///
    /// Frames carrying any other message ID are rejected with
    /// [`SpatError::UnsupportedMessage`].
    fn decode_spat(&self, frame: &MessageFrame) -> Result<Spat>;

    /// Decode a payload straight through to its SPAT.
    fn decode(&self, payload: &[u8]) -> Result<Spat> {
        let frame = self.decode_frame(payload)?;
        self.decode_spat(&frame)
    }
}

/// Unaligned PER decoder for J2735 MessageFrames.
#[derive(Debug, Clone, Copy, Default)]
pub struct UperDecoder {
    _private: (),
}

impl UperDecoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageDecoder for UperDecoder {
    fn decode_frame(&self, payload: &[u8]) -> Result<MessageFrame> {
        if payload.is_empty() {
            return Err(SpatError::decode("MessageFrame", "empty payload"));
        }
        let frame = MessageFrame::from_uper(payload)?;
        debug!(
            message_id = frame.message_id,
            message = frame.message_name(),
            bytes = frame.value.len(),
            "decoded MessageFrame"
        );
        Ok(frame)
    }

    fn decode_spat(&self, frame: &MessageFrame) -> Result<Spat> {
        if !frame.is_spat() {
            return Err(SpatError::unsupported_message(frame.message_id));
        }
        let spat = Spat::from_uper(&frame.value)?;
        debug!(
            intersections = spat.intersections.len(),
            events = spat.event_count(),
            "decoded SPAT"
        );
        trace!(?spat, "SPAT tree");
        Ok(spat)
    }
}
