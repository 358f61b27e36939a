// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Outbound summary encodings.
//!
//! # Versioned (default)
//!
//! Big-endian, one record per tracked intersection:
//!
//! ```text
//! magic    "SPTS"
//! version  u8 = 1
//! count    u8
//! record*  slot u8 | intersection_id u16 | movement_name [u8; 4]
//!          | signal_group u8 | event_state u8 | min_end_time u16
//! ```
//!
//! # Legacy
//!
//! The fixed layout older consumers read: every table slot as 24 little-endian
//! bytes (`i32` ID, 5-byte NUL-terminated name, 3 pad bytes, `i32` group,
//! `i32` state, `u32` end time), zero-filled to [`LEGACY_DATAGRAM_LEN`].

use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

use crate::aggregate::{AllowList, MovementName, SignalRecord, SignalTable, MOVEMENT_NAME_LEN};
use crate::core::WireFormat;
use crate::{Result, SpatError};

/// Magic bytes opening a versioned summary.
pub const WIRE_MAGIC: &[u8; 4] = b"SPTS";
/// Current versioned summary revision.
pub const WIRE_VERSION: u8 = 1;
/// Versioned header size.
pub const HEADER_LEN: usize = 6;
/// Versioned record size.
pub const RECORD_LEN: usize = 11;
/// Legacy per-slot size.
pub const LEGACY_SLOT_LEN: usize = 24;
/// Minimum legacy datagram size.
pub const LEGACY_DATAGRAM_LEN: usize = 1024;

/// One record of a versioned summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotRecord {
    pub slot: u8,
    #[serde(flatten)]
    pub record: SignalRecord,
}

/// Encode a table in the given format.
pub fn encode(format: WireFormat, table: &SignalTable, allow_list: &AllowList) -> Result<Vec<u8>> {
    match format {
        WireFormat::Versioned => encode_versioned(table, allow_list),
        WireFormat::Legacy => encode_legacy(table),
    }
}

/// Encode the slots of every tracked intersection.
pub fn encode_versioned(table: &SignalTable, allow_list: &AllowList) -> Result<Vec<u8>> {
    let count = u8::try_from(allow_list.len()).map_err(|_| {
        SpatError::encode(
            "summary",
            format!("{} records exceed the u8 count field", allow_list.len()),
        )
    })?;
    let mut buf = Vec::with_capacity(HEADER_LEN + RECORD_LEN * usize::from(count));
    buf.write_all(WIRE_MAGIC).map_err(encode_err)?;
    buf.write_u8(WIRE_VERSION).map_err(encode_err)?;
    buf.write_u8(count).map_err(encode_err)?;

    for slot in 0..usize::from(count) {
        let record = table.slot(slot).copied().ok_or_else(|| {
            SpatError::encode(
                "summary",
                format!("slot {slot} outside table of {}", table.capacity()),
            )
        })?;
        // slot < count <= u8::MAX
        buf.write_u8(slot as u8).map_err(encode_err)?;
        buf.write_u16::<BigEndian>(record.intersection_id)
            .map_err(encode_err)?;
        buf.write_all(record.movement_name.as_bytes())
            .map_err(encode_err)?;
        buf.write_u8(record.signal_group).map_err(encode_err)?;
        buf.write_u8(record.event_state).map_err(encode_err)?;
        buf.write_u16::<BigEndian>(record.min_end_time)
            .map_err(encode_err)?;
    }
    Ok(buf)
}

/// Parse a versioned summary.
pub fn decode_versioned(data: &[u8]) -> Result<Vec<SlotRecord>> {
    let mut cursor = Cursor::new(data);
    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(decode_err)?;
    if &magic != WIRE_MAGIC {
        return Err(SpatError::decode(
            "summary",
            format!("bad magic {}", hex::encode(magic)),
        ));
    }
    let version = cursor.read_u8().map_err(decode_err)?;
    if version != WIRE_VERSION {
        return Err(SpatError::decode(
            "summary",
            format!("unsupported version {version}"),
        ));
    }
    let count = cursor.read_u8().map_err(decode_err)?;
    let expected = HEADER_LEN + RECORD_LEN * usize::from(count);
    if data.len() != expected {
        return Err(SpatError::decode(
            "summary",
            format!("{count} records need {expected} bytes, got {}", data.len()),
        ));
    }

    let mut records = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let slot = cursor.read_u8().map_err(decode_err)?;
        let intersection_id = cursor.read_u16::<BigEndian>().map_err(decode_err)?;
        let mut name = [0u8; MOVEMENT_NAME_LEN];
        cursor.read_exact(&mut name).map_err(decode_err)?;
        let signal_group = cursor.read_u8().map_err(decode_err)?;
        let event_state = cursor.read_u8().map_err(decode_err)?;
        let min_end_time = cursor.read_u16::<BigEndian>().map_err(decode_err)?;
        records.push(SlotRecord {
            slot,
            record: SignalRecord {
                intersection_id,
                movement_name: MovementName::from_bytes(name),
                signal_group,
                event_state,
                min_end_time,
            },
        });
    }
    Ok(records)
}

/// Encode every table slot in the legacy fixed layout.
pub fn encode_legacy(table: &SignalTable) -> Result<Vec<u8>> {
    let len = (LEGACY_SLOT_LEN * table.capacity()).max(LEGACY_DATAGRAM_LEN);
    let mut buf = Vec::with_capacity(len);
    for record in table.slots() {
        buf.write_i32::<LittleEndian>(i32::from(record.intersection_id))
            .map_err(encode_err)?;
        buf.write_all(record.movement_name.as_bytes())
            .map_err(encode_err)?;
        // NUL terminator plus alignment padding
        buf.write_all(&[0u8; 4]).map_err(encode_err)?;
        buf.write_i32::<LittleEndian>(i32::from(record.signal_group))
            .map_err(encode_err)?;
        buf.write_i32::<LittleEndian>(i32::from(record.event_state))
            .map_err(encode_err)?;
        buf.write_u32::<LittleEndian>(u32::from(record.min_end_time))
            .map_err(encode_err)?;
    }
    buf.resize(len, 0);
    Ok(buf)
}

fn encode_err(err: std::io::Error) -> SpatError {
    SpatError::encode("summary", err.to_string())
}

fn decode_err(err: std::io::Error) -> SpatError {
    SpatError::decode("summary", err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::j2735::{
        IntersectionReferenceId, IntersectionState, MovementEvent, MovementPhaseState,
        MovementState, Spat, TimeChangeDetails,
    };

    fn sample_table() -> SignalTable {
        let spat = Spat {
            intersections: vec![IntersectionState {
                id: IntersectionReferenceId {
                    region: None,
                    id: 400,
                },
                states: vec![MovementState {
                    movement_name: Some("2A".into()),
                    signal_group: 2,
                    state_time_speed: vec![MovementEvent {
                        event_state: MovementPhaseState::StopAndRemain,
                        timing: Some(TimeChangeDetails {
                            min_end_time: 0x0102,
                            ..Default::default()
                        }),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        Aggregator::default().summarize(&spat)
    }

    #[test]
    fn test_versioned_layout() {
        let bytes = encode_versioned(&sample_table(), &AllowList::reference()).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 5 * RECORD_LEN);
        assert_eq!(&bytes[..6], b"SPTS\x01\x05");

        let slot2 = &bytes[HEADER_LEN + 2 * RECORD_LEN..HEADER_LEN + 3 * RECORD_LEN];
        assert_eq!(
            slot2,
            &[0x02, 0x01, 0x90, b'2', b'A', 0, 0, 0x02, 0x03, 0x01, 0x02]
        );
        // untracked-this-cycle slots are present and zero
        assert_eq!(&bytes[HEADER_LEN + 1..HEADER_LEN + RECORD_LEN], &[0u8; 10]);
    }

    #[test]
    fn test_versioned_decode() {
        let table = sample_table();
        let bytes = encode_versioned(&table, &AllowList::reference()).unwrap();
        let records = decode_versioned(&bytes).unwrap();
        assert_eq!(records.len(), 5);
        for r in &records {
            assert_eq!(r.record, *table.slot(usize::from(r.slot)).unwrap());
        }
        assert_eq!(records[2].record.movement_name.as_str(), "2A");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_versioned(b"XXXX\x01\x00").is_err());
        assert!(decode_versioned(b"SPTS\x02\x00").is_err());
        assert!(decode_versioned(b"SPTS\x01\x01\x00").is_err());
        assert!(decode_versioned(b"SPT").is_err());
        assert_eq!(decode_versioned(b"SPTS\x01\x00").unwrap(), vec![]);
    }

    #[test]
    fn test_legacy_layout() {
        let bytes = encode_legacy(&sample_table()).unwrap();
        assert_eq!(bytes.len(), LEGACY_DATAGRAM_LEN);

        let slot2 = &bytes[2 * LEGACY_SLOT_LEN..3 * LEGACY_SLOT_LEN];
        assert_eq!(&slot2[0..4], &400i32.to_le_bytes());
        assert_eq!(&slot2[4..9], b"2A\0\0\0");
        assert_eq!(&slot2[9..12], &[0, 0, 0]);
        assert_eq!(&slot2[12..16], &2i32.to_le_bytes());
        assert_eq!(&slot2[16..20], &3i32.to_le_bytes());
        assert_eq!(&slot2[20..24], &0x0102u32.to_le_bytes());
        assert!(bytes[3 * LEGACY_SLOT_LEN..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_count_overflow() {
        let entries = (1..=256u16)
            .map(|id| crate::aggregate::TrackedIntersection::new(id, 1))
            .collect();
        let list = AllowList::new(entries).unwrap();
        let table = SignalTable::new(256);
        assert!(matches!(
            encode_versioned(&table, &list),
            Err(SpatError::EncodeError { .. })
        ));
    }

    #[test]
    fn test_encode_dispatch() {
        let table = SignalTable::default();
        let list = AllowList::reference();
        assert_eq!(
            encode(WireFormat::Legacy, &table, &list).unwrap().len(),
            LEGACY_DATAGRAM_LEN
        );
        assert_eq!(
            encode(WireFormat::Versioned, &table, &list).unwrap().len(),
            HEADER_LEN + 5 * RECORD_LEN
        );
    }
}
