// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Frame gate for inbound datagrams.
//!
//! Datagrams from the roadside unit carry a fixed-size vendor prefix in front
//! of the UPER `MessageFrame`. The gate checks a single tag byte to recognise
//! SPAT traffic and strips the prefix. Anything else is dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SpatError;

/// Default length of the vendor prefix.
pub const DEFAULT_PREFIX_LEN: usize = 16;
/// Default offset of the tag byte (second octet of the MessageFrame).
pub const DEFAULT_TAG_OFFSET: usize = 17;
/// Default tag value: low octet of message ID 19.
pub const DEFAULT_TAG: u8 = 0x13;
/// Default receive buffer size.
pub const DEFAULT_MAX_DATAGRAM: usize = 1024;

/// Reasons a datagram does not pass the gate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Datagram ends before the tag byte or the prefix.
    #[error("datagram too short: {len} bytes, need at least {needed}")]
    TooShort { len: usize, needed: usize },

    /// Tag byte does not match.
    #[error("tag mismatch at offset {offset}: expected {expected:#04x}, got {got:#04x}")]
    TagMismatch { offset: usize, expected: u8, got: u8 },
}

impl From<FrameError> for SpatError {
    fn from(err: FrameError) -> Self {
        SpatError::gate_rejected(err.to_string())
    }
}

/// Frame layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Bytes stripped from the front of every datagram
    pub prefix_len: usize,
    /// Offset of the tag byte within the datagram
    pub tag_offset: usize,
    /// Expected tag value
    pub tag: u8,
    /// Receive buffer size
    pub max_datagram: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            prefix_len: DEFAULT_PREFIX_LEN,
            tag_offset: DEFAULT_TAG_OFFSET,
            tag: DEFAULT_TAG,
            max_datagram: DEFAULT_MAX_DATAGRAM,
        }
    }
}

/// Structural check and prefix stripping.
#[derive(Debug, Clone)]
pub struct FrameGate {
    prefix_len: usize,
    tag_offset: usize,
    tag: u8,
}

impl FrameGate {
    /// Create a gate from frame settings.
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            prefix_len: config.prefix_len,
            tag_offset: config.tag_offset,
            tag: config.tag,
        }
    }

    /// Return the UPER payload of a datagram that passes the gate.
    pub fn payload<'a>(&self, datagram: &'a [u8]) -> Result<&'a [u8], FrameError> {
        let got = *datagram.get(self.tag_offset).ok_or(FrameError::TooShort {
            len: datagram.len(),
            needed: self.tag_offset + 1,
        })?;
        if got != self.tag {
            return Err(FrameError::TagMismatch {
                offset: self.tag_offset,
                expected: self.tag,
                got,
            });
        }
        datagram
            .get(self.prefix_len..)
            .ok_or(FrameError::TooShort {
                len: datagram.len(),
                needed: self.prefix_len,
            })
    }

    /// Build a datagram around a payload with a zeroed prefix.
    ///
    /// The payload is expected to place the tag byte itself; nothing is
    /// patched into it.
    pub fn wrap(&self, payload: &[u8]) -> Vec<u8> {
        let mut datagram = vec![0u8; self.prefix_len];
        datagram.extend_from_slice(payload);
        datagram
    }
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new(&FrameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datagram(tag: u8, len: usize) -> Vec<u8> {
        let mut d = vec![0u8; len];
        if len > DEFAULT_TAG_OFFSET {
            d[DEFAULT_TAG_OFFSET] = tag;
        }
        d
    }

    #[test]
    fn test_payload_strips_prefix() {
        let gate = FrameGate::default();
        let d = datagram(0x13, 40);
        let payload = gate.payload(&d).unwrap();
        assert_eq!(payload.len(), 24);
        assert_eq!(payload[1], 0x13);
    }

    #[test]
    fn test_tag_mismatch() {
        let gate = FrameGate::default();
        let err = gate.payload(&datagram(0x14, 40)).unwrap_err();
        assert_eq!(
            err,
            FrameError::TagMismatch {
                offset: 17,
                expected: 0x13,
                got: 0x14
            }
        );
        assert_eq!(
            err.to_string(),
            "tag mismatch at offset 17: expected 0x13, got 0x14"
        );
    }

    #[test]
    fn test_short_datagram() {
        let gate = FrameGate::default();
        assert!(matches!(
            gate.payload(&[0u8; 17]),
            Err(FrameError::TooShort { len: 17, needed: 18 })
        ));
        assert!(matches!(gate.payload(&[]), Err(FrameError::TooShort { .. })));
    }

    #[test]
    fn test_prefix_longer_than_tag_offset() {
        let gate = FrameGate::new(&FrameConfig {
            prefix_len: 32,
            tag_offset: 1,
            ..Default::default()
        });
        let mut d = vec![0u8; 20];
        d[1] = 0x13;
        assert!(matches!(
            gate.payload(&d),
            Err(FrameError::TooShort { len: 20, needed: 32 })
        ));
    }

    #[test]
    fn test_wrap_places_payload_after_prefix() {
        let gate = FrameGate::default();
        let d = gate.wrap(&[0x00, 0x13, 0x01]);
        assert_eq!(d.len(), 19);
        assert_eq!(gate.payload(&d).unwrap(), &[0x00, 0x13, 0x01]);
    }

    #[test]
    fn test_into_spat_error() {
        let err: SpatError = FrameError::TooShort { len: 3, needed: 18 }.into();
        assert!(matches!(err, SpatError::GateRejected { .. }));
    }
}
