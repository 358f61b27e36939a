// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Signal-state aggregation.
//!
//! Walks a decoded [`Spat`] depth-first (intersections, then movements, then
//! events, each in list order) and records, for every tracked intersection,
//! the current phase of its one tracked signal group. A later matching event
//! overwrites an earlier one, so the last event in traversal order wins.
//!
//! # Example
//!
//! ```
//! use spat_relay::aggregate::{Aggregator, AllowList};
//! use spat_relay::j2735::Spat;
//! use spat_relay::MatchScope;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let aggregator = Aggregator::new(AllowList::reference(), MatchScope::Intersection, 11)?;
//! let table = aggregator.summarize(&Spat::default());
//! assert!(table.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod allow_list;
pub mod table;

pub use allow_list::{AllowList, TrackedIntersection, REFERENCE_TRACKED};
pub use table::{
    MovementName, SignalRecord, SignalTable, DEFAULT_TABLE_CAPACITY, MOVEMENT_NAME_LEN,
};

use tracing::{debug, trace};

use crate::core::MatchScope;
use crate::j2735::{MovementEvent, MovementState, Spat};
use crate::{Result, SpatError};

/// Builds signal tables from decoded SPAT messages.
#[derive(Debug, Clone)]
pub struct Aggregator {
    allow_list: AllowList,
    scope: MatchScope,
    capacity: usize,
}

impl Aggregator {
    /// Create an aggregator producing tables of `capacity` slots.
    ///
    /// The capacity must hold every allow-list slot.
    pub fn new(allow_list: AllowList, scope: MatchScope, capacity: usize) -> Result<Self> {
        if allow_list.len() > capacity {
            return Err(SpatError::invalid_config(
                "aggregate.table_capacity",
                format!(
                    "{} tracked intersections do not fit in {capacity} slots",
                    allow_list.len()
                ),
            ));
        }
        Ok(Self {
            allow_list,
            scope,
            capacity,
        })
    }

    /// The allow-list in slot order.
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// The match scope.
    pub fn scope(&self) -> MatchScope {
        self.scope
    }

    /// A zeroed table sized for this aggregator.
    pub fn empty_table(&self) -> SignalTable {
        SignalTable::new(self.capacity)
    }

    /// Aggregate into a fresh table.
    pub fn summarize(&self, spat: &Spat) -> SignalTable {
        let mut table = self.empty_table();
        self.aggregate(spat, &mut table);
        table
    }

    /// Walk `spat` and update `table` in place.
    ///
    /// Returns how many slot writes happened, including overwrites.
    pub fn aggregate(&self, spat: &Spat, table: &mut SignalTable) -> usize {
        let mut writes = 0;
        for intersection in &spat.intersections {
            let id = intersection.id.id;
            let own_slot = self.allow_list.slot_of(id);
            match own_slot.and_then(|slot| table.slot_mut(slot)) {
                Some(record) => record.intersection_id = id,
                None => trace!(intersection_id = id, "intersection not tracked"),
            }

            for movement in &intersection.states {
                for event in &movement.state_time_speed {
                    writes += match self.scope {
                        MatchScope::Intersection => own_slot
                            .map_or(0, |slot| self.apply(slot, movement, event, table)),
                        MatchScope::Cycle => (0..self.allow_list.len())
                            .map(|slot| self.apply(slot, movement, event, table))
                            .sum(),
                    };
                }
            }
        }
        debug!(
            intersections = spat.intersections.len(),
            writes,
            assigned = table.assigned().count(),
            "aggregated SPAT"
        );
        writes
    }

    /// Record `event` into `slot` when the slot is marked and the group matches.
    fn apply(
        &self,
        slot: usize,
        movement: &MovementState,
        event: &MovementEvent,
        table: &mut SignalTable,
    ) -> usize {
        let Some(tracked) = self.allow_list.get(slot) else {
            return 0;
        };
        let Some(record) = table.slot_mut(slot) else {
            return 0;
        };
        if record.intersection_id != tracked.intersection_id
            || movement.signal_group != tracked.signal_group
        {
            return 0;
        }
        record.movement_name = movement
            .movement_name
            .as_deref()
            .map(MovementName::truncate_from)
            .unwrap_or_default();
        record.signal_group = movement.signal_group;
        record.event_state = event.event_state.code();
        record.min_end_time = event.min_end_time();
        trace!(
            slot,
            intersection_id = record.intersection_id,
            signal_group = record.signal_group,
            event_state = record.event_state,
            min_end_time = record.min_end_time,
            "slot updated"
        );
        1
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self {
            allow_list: AllowList::reference(),
            scope: MatchScope::default(),
            capacity: DEFAULT_TABLE_CAPACITY,
        }
    }
}
