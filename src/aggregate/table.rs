// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-cycle signal state table.

use std::fmt;

use serde::{Serialize, Serializer};

/// Usable bytes of a movement name.
pub const MOVEMENT_NAME_LEN: usize = 4;

/// Slot count of the reference table.
pub const DEFAULT_TABLE_CAPACITY: usize = 11;

/// Short movement label, at most [`MOVEMENT_NAME_LEN`] ASCII bytes, NUL padded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MovementName([u8; MOVEMENT_NAME_LEN]);

impl MovementName {
    /// Copy a decoded name, truncating to [`MOVEMENT_NAME_LEN`] bytes.
    ///
    /// Non-ASCII and NUL characters become `?`.
    pub fn truncate_from(name: &str) -> Self {
        let mut buf = [0u8; MOVEMENT_NAME_LEN];
        for (dst, ch) in buf.iter_mut().zip(name.chars()) {
            *dst = if ch.is_ascii() && ch != '\0' {
                ch as u8
            } else {
                b'?'
            };
        }
        Self(buf)
    }

    /// Rebuild from padded wire bytes.
    pub fn from_bytes(bytes: [u8; MOVEMENT_NAME_LEN]) -> Self {
        Self(bytes)
    }

    /// The padded bytes.
    pub fn as_bytes(&self) -> &[u8; MOVEMENT_NAME_LEN] {
        &self.0
    }

    /// The name up to the first NUL.
    pub fn as_str(&self) -> &str {
        let end = self
            .0
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MOVEMENT_NAME_LEN);
        std::str::from_utf8(&self.0[..end]).unwrap_or("")
    }

    /// Check if no name is set.
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl fmt::Debug for MovementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for MovementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MovementName {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// Latest observed signal state of one tracked intersection.
///
/// The all-zero record means "unassigned this cycle".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SignalRecord {
    /// Intersection ID, 0 when unassigned
    pub intersection_id: u16,
    pub movement_name: MovementName,
    pub signal_group: u8,
    /// Raw `MovementPhaseState` code
    pub event_state: u8,
    /// Tenths of a second within the hour
    pub min_end_time: u16,
}

impl SignalRecord {
    /// Check if this is the zero record.
    pub fn is_unassigned(&self) -> bool {
        *self == SignalRecord::default()
    }
}

/// Fixed-capacity table of signal records, one slot per tracked intersection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalTable {
    slots: Vec<SignalRecord>,
}

impl SignalTable {
    /// Create a zeroed table with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![SignalRecord::default(); capacity],
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// All slots in order.
    pub fn slots(&self) -> &[SignalRecord] {
        &self.slots
    }

    /// Record at a slot.
    pub fn slot(&self, index: usize) -> Option<&SignalRecord> {
        self.slots.get(index)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut SignalRecord> {
        self.slots.get_mut(index)
    }

    /// Slots with an assigned intersection.
    pub fn assigned(&self) -> impl Iterator<Item = (usize, &SignalRecord)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, r)| r.intersection_id != 0)
    }

    /// Zero every slot.
    pub fn reset(&mut self) {
        self.slots.fill(SignalRecord::default());
    }

    /// Check if every slot is the zero record.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(SignalRecord::is_unassigned)
    }
}

impl Default for SignalTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_CAPACITY)
    }
}
