// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoded SPAT message tree.
//!
//! `Spat -> intersections -> states (movements) -> state_time_speed (events)`.
//! Optional SEQUENCE OF components are represented by empty vectors when
//! absent, since every such list in the schema has a lower size bound of 1.

use serde::{Deserialize, Serialize};

use super::phase::MovementPhaseState;

/// `MinuteOfTheYear` value meaning "unknown".
pub const MINUTE_OF_YEAR_UNKNOWN: u32 = 527_040;

/// `TimeMark` value meaning "unknown".
pub const TIME_MARK_UNKNOWN: u16 = 36_001;

/// Signal Phase and Timing message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Spat {
    /// Minute of the year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<u32>,
    /// Descriptive name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Intersection states, 1..=32
    pub intersections: Vec<IntersectionState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regional: Vec<RegionalExtension>,
}

/// Signal state of one intersection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntersectionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub id: IntersectionReferenceId,
    /// Message revision counter (0..=127)
    pub revision: u8,
    /// `IntersectionStatusObject` bit string
    pub status: u16,
    /// Minute of the year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moy: Option<u32>,
    /// Milliseconds within the minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_lanes: Vec<u8>,
    /// Movement states, 1..=255
    pub states: Vec<MovementState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maneuver_assist_list: Vec<ConnectionManeuverAssist>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regional: Vec<RegionalExtension>,
}

/// Globally unique intersection reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IntersectionReferenceId {
    /// Road regulator ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<u16>,
    /// Intersection ID, unique within the region
    pub id: u16,
}

/// State of one movement (signal group).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovementState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_name: Option<String>,
    pub signal_group: u8,
    /// Movement events, 1..=16
    pub state_time_speed: Vec<MovementEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maneuver_assist_list: Vec<ConnectionManeuverAssist>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regional: Vec<RegionalExtension>,
}

/// One phase with its timing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovementEvent {
    pub event_state: MovementPhaseState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimeChangeDetails>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub speeds: Vec<AdvisorySpeed>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regional: Vec<RegionalExtension>,
}

/// Phase timing, all values in tenths of a second within the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeChangeDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u16>,
    pub min_end_time: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_end_time: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likely_time: Option<u16>,
    /// `TimeIntervalConfidence` (0..=15)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_time: Option<u16>,
}

/// Advisory speed for a movement event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdvisorySpeed {
    /// `AdvisorySpeedType` index: none, greenwave, ecoDrive, transit
    pub speed_type: u8,
    /// Units of 0.1 m/s (0..=500)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<u16>,
    /// `SpeedConfidence` index (0..=7)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    /// Metres (0..=10000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regional: Vec<RegionalExtension>,
}

/// Dynamic lane connection information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionManeuverAssist {
    pub connection_id: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_storage_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_on_stop: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ped_bicycle_detect: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regional: Vec<RegionalExtension>,
}

/// Regional extension kept as its undecoded open type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionalExtension {
    pub region_id: u8,
    #[serde(with = "super::hex_bytes")]
    pub value: Vec<u8>,
}

impl MovementEvent {
    /// `minEndTime` of the event, or 0 when no timing was sent.
    pub fn min_end_time(&self) -> u16 {
        self.timing.map_or(0, |t| t.min_end_time)
    }
}

impl Spat {
    /// Total number of movement events in the message.
    pub fn event_count(&self) -> usize {
        self.intersections
            .iter()
            .flat_map(|i| &i.states)
            .map(|m| m.state_time_speed.len())
            .sum()
    }
}
