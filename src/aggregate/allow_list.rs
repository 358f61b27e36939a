// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Static allow-list of tracked intersections.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Result, SpatError};

/// Intersection/signal-group pairs tracked by the reference deployment, in slot order.
pub const REFERENCE_TRACKED: [(u16, u8); 5] = [(200, 1), (300, 1), (400, 2), (610, 1), (700, 8)];

/// One tracked intersection and the signal group recorded for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackedIntersection {
    /// Intersection ID to match
    pub intersection_id: u16,
    /// The one signal group recorded for this intersection
    pub signal_group: u8,
}

impl TrackedIntersection {
    /// Create a new entry.
    pub fn new(intersection_id: u16, signal_group: u8) -> Self {
        Self {
            intersection_id,
            signal_group,
        }
    }
}

/// Ordered allow-list; an entry's position is its table slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    entries: Vec<TrackedIntersection>,
    by_id: HashMap<u16, usize>,
}

impl AllowList {
    /// Build an allow-list, rejecting duplicate IDs and the reserved ID 0.
    pub fn new(entries: Vec<TrackedIntersection>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(entries.len());
        for (slot, entry) in entries.iter().enumerate() {
            if entry.intersection_id == 0 {
                return Err(SpatError::invalid_config(
                    "aggregate.track",
                    format!("slot {slot}: intersection ID 0 marks an unassigned slot"),
                ));
            }
            if by_id.insert(entry.intersection_id, slot).is_some() {
                return Err(SpatError::invalid_config(
                    "aggregate.track",
                    format!("intersection {} listed twice", entry.intersection_id),
                ));
            }
        }
        Ok(Self { entries, by_id })
    }

    /// The five-entry table of the reference deployment.
    pub fn reference() -> Self {
        let entries = REFERENCE_TRACKED
            .iter()
            .map(|&(id, group)| TrackedIntersection::new(id, group))
            .collect::<Vec<_>>();
        let by_id = entries
            .iter()
            .enumerate()
            .map(|(slot, e)| (e.intersection_id, slot))
            .collect();
        Self { entries, by_id }
    }

    /// Slot assigned to an intersection ID.
    pub fn slot_of(&self, intersection_id: u16) -> Option<usize> {
        self.by_id.get(&intersection_id).copied()
    }

    /// Entry at a slot.
    pub fn get(&self, slot: usize) -> Option<&TrackedIntersection> {
        self.entries.get(slot)
    }

    /// Entries in slot order.
    pub fn entries(&self) -> &[TrackedIntersection] {
        &self.entries
    }

    /// Number of tracked intersections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::reference()
    }
}
