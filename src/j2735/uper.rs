// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! UPER codec for the J2735 SPAT subset.
//!
//! Every extensible SEQUENCE is encoded as: extension bit, presence bitmap of
//! its OPTIONAL root components, the root components in order, and (only when
//! the extension bit is set) the extension additions, which are skipped on
//! decode and never produced on encode.

use tracing::trace;

use super::phase::MovementPhaseState;
use super::spat::{
    AdvisorySpeed, ConnectionManeuverAssist, IntersectionReferenceId, IntersectionState,
    MovementEvent, MovementState, RegionalExtension, Spat, TimeChangeDetails,
};
use super::MessageFrame;
use crate::encoding::uper::{UperCursor, UperWriter};
use crate::{Result as CoreResult, SpatError};

/// `DSRCmsgID` upper bound.
const MAX_MESSAGE_ID: i64 = 32_767;
/// `DescriptiveName` size bounds.
const NAME_MIN: usize = 1;
const NAME_MAX: usize = 63;
/// `MinuteOfTheYear` upper bound.
const MINUTE_OF_YEAR_MAX: i64 = 527_040;
/// `TimeMark` upper bound.
const TIME_MARK_MAX: i64 = 36_001;
/// `ZoneLength` upper bound.
const ZONE_LENGTH_MAX: i64 = 10_000;
/// Regional extension list bounds.
const REGIONAL_MAX: usize = 4;

const MAX_INTERSECTIONS: usize = 32;
const MAX_MOVEMENTS: usize = 255;
const MAX_EVENTS: usize = 16;
const MAX_LIST_16: usize = 16;

/// A type with an unaligned PER encoding.
pub trait UperMessage: Sized {
    /// Decode from the cursor's current position.
    fn decode_uper(cursor: &mut UperCursor<'_>) -> CoreResult<Self>;

    /// Append the encoding to the writer.
    fn encode_uper(&self, writer: &mut UperWriter) -> CoreResult<()>;

    /// Decode a complete encoding.
    fn from_uper(bytes: &[u8]) -> CoreResult<Self> {
        let mut cursor = UperCursor::new(bytes);
        Self::decode_uper(&mut cursor)
    }

    /// Produce a complete, octet-padded encoding.
    fn to_uper(&self) -> CoreResult<Vec<u8>> {
        let mut writer = UperWriter::new();
        self.encode_uper(&mut writer)?;
        Ok(writer.into_bytes())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn decode_list<T>(
    cursor: &mut UperCursor<'_>,
    lower: usize,
    upper: usize,
    mut item: impl FnMut(&mut UperCursor<'_>) -> CoreResult<T>,
) -> CoreResult<Vec<T>> {
    let count = cursor.read_size(lower, upper)?;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(item(cursor)?);
    }
    Ok(out)
}

fn encode_list<T>(
    writer: &mut UperWriter,
    field: &str,
    items: &[T],
    lower: usize,
    upper: usize,
    mut item: impl FnMut(&mut UperWriter, &T) -> CoreResult<()>,
) -> CoreResult<()> {
    writer.write_size(field, items.len(), lower, upper)?;
    for it in items {
        item(writer, it)?;
    }
    Ok(())
}

fn read_u16(cursor: &mut UperCursor<'_>, upper: i64) -> CoreResult<u16> {
    Ok(cursor.read_constrained(0, upper)? as u16)
}

fn read_u8(cursor: &mut UperCursor<'_>, upper: i64) -> CoreResult<u8> {
    Ok(cursor.read_constrained(0, upper)? as u8)
}

fn read_enumerated_u8(
    cursor: &mut UperCursor<'_>,
    root_count: u32,
    extensible: bool,
    field: &str,
) -> CoreResult<u8> {
    let index = cursor.read_enumerated(root_count, extensible)?;
    u8::try_from(index)
        .map_err(|_| SpatError::decode(field, format!("enumerated index {index} out of range")))
}

fn read_name(cursor: &mut UperCursor<'_>) -> CoreResult<String> {
    cursor.read_ia5_string(NAME_MIN, NAME_MAX)
}

fn write_name(writer: &mut UperWriter, field: &str, name: &str) -> CoreResult<()> {
    writer.write_ia5_string(field, name, NAME_MIN, NAME_MAX)
}

fn read_optional<T>(
    present: bool,
    cursor: &mut UperCursor<'_>,
    read: impl FnOnce(&mut UperCursor<'_>) -> CoreResult<T>,
) -> CoreResult<Option<T>> {
    if present {
        read(cursor).map(Some)
    } else {
        Ok(None)
    }
}

fn write_optional<T: Copy + Into<i64>>(
    writer: &mut UperWriter,
    field: &str,
    value: Option<T>,
    upper: i64,
) -> CoreResult<()> {
    if let Some(v) = value {
        writer.write_constrained(field, v.into(), 0, upper)?;
    }
    Ok(())
}

fn decode_regional(cursor: &mut UperCursor<'_>) -> CoreResult<Vec<RegionalExtension>> {
    decode_list(cursor, 1, REGIONAL_MAX, RegionalExtension::decode_uper)
}

fn encode_regional(writer: &mut UperWriter, regional: &[RegionalExtension]) -> CoreResult<()> {
    encode_list(writer, "regional", regional, 1, REGIONAL_MAX, |w, r| {
        r.encode_uper(w)
    })
}

fn finish_extensions(
    extended: bool,
    cursor: &mut UperCursor<'_>,
    context: &str,
) -> CoreResult<()> {
    if extended {
        let skipped = cursor.skip_extensions()?;
        trace!(context, skipped, "skipped extension additions");
    }
    Ok(())
}

// =============================================================================
// MessageFrame
// =============================================================================

impl UperMessage for MessageFrame {
    fn decode_uper(cursor: &mut UperCursor<'_>) -> CoreResult<Self> {
        let extended = cursor.read_bit()?;
        let message_id = cursor.read_constrained(0, MAX_MESSAGE_ID)? as u16;
        let value = cursor.read_open_type()?;
        finish_extensions(extended, cursor, "MessageFrame")?;
        Ok(MessageFrame { message_id, value })
    }

    fn encode_uper(&self, writer: &mut UperWriter) -> CoreResult<()> {
        writer.write_bit(false);
        writer.write_constrained(
            "messageId",
            i64::from(self.message_id),
            0,
            MAX_MESSAGE_ID,
        )?;
        writer.write_open_type(&self.value)
    }
}

// =============================================================================
// SPAT
// =============================================================================

impl UperMessage for Spat {
    fn decode_uper(cursor: &mut UperCursor<'_>) -> CoreResult<Self> {
        let extended = cursor.read_bit()?;
        let p = cursor.read_presence(3)?;
        let time_stamp = read_optional(p[0], cursor, |c| {
            Ok(c.read_constrained(0, MINUTE_OF_YEAR_MAX)? as u32)
        })?;
        let name = read_optional(p[1], cursor, read_name)?;
        let intersections = decode_list(
            cursor,
            1,
            MAX_INTERSECTIONS,
            IntersectionState::decode_uper,
        )?;
        let regional = if p[2] { decode_regional(cursor)? } else { Vec::new() };
        finish_extensions(extended, cursor, "SPAT")?;
        Ok(Spat {
            time_stamp,
            name,
            intersections,
            regional,
        })
    }

    fn encode_uper(&self, writer: &mut UperWriter) -> CoreResult<()> {
        writer.write_bit(false);
        writer.write_bit(self.time_stamp.is_some());
        writer.write_bit(self.name.is_some());
        writer.write_bit(!self.regional.is_empty());
        write_optional(writer, "timeStamp", self.time_stamp, MINUTE_OF_YEAR_MAX)?;
        if let Some(name) = &self.name {
            write_name(writer, "SPAT.name", name)?;
        }
        encode_list(
            writer,
            "intersections",
            &self.intersections,
            1,
            MAX_INTERSECTIONS,
            |w, i| i.encode_uper(w),
        )?;
        if !self.regional.is_empty() {
            encode_regional(writer, &self.regional)?;
        }
        Ok(())
    }
}

impl UperMessage for IntersectionState {
    fn decode_uper(cursor: &mut UperCursor<'_>) -> CoreResult<Self> {
        let extended = cursor.read_bit()?;
        let p = cursor.read_presence(6)?;
        let name = read_optional(p[0], cursor, read_name)?;
        let id = IntersectionReferenceId::decode_uper(cursor)?;
        let revision = read_u8(cursor, 127)?;
        let status = cursor.read_fixed_bit_string(16)? as u16;
        let moy = read_optional(p[1], cursor, |c| {
            Ok(c.read_constrained(0, MINUTE_OF_YEAR_MAX)? as u32)
        })?;
        let time_stamp = read_optional(p[2], cursor, |c| read_u16(c, 65_535))?;
        let enabled_lanes = if p[3] {
            decode_list(cursor, 1, MAX_LIST_16, |c| read_u8(c, 255))?
        } else {
            Vec::new()
        };
        let states = decode_list(cursor, 1, MAX_MOVEMENTS, MovementState::decode_uper)?;
        let maneuver_assist_list = if p[4] {
            decode_list(cursor, 1, MAX_LIST_16, ConnectionManeuverAssist::decode_uper)?
        } else {
            Vec::new()
        };
        let regional = if p[5] { decode_regional(cursor)? } else { Vec::new() };
        finish_extensions(extended, cursor, "IntersectionState")?;
        Ok(IntersectionState {
            name,
            id,
            revision,
            status,
            moy,
            time_stamp,
            enabled_lanes,
            states,
            maneuver_assist_list,
            regional,
        })
    }

    fn encode_uper(&self, writer: &mut UperWriter) -> CoreResult<()> {
        writer.write_bit(false);
        writer.write_bit(self.name.is_some());
        writer.write_bit(self.moy.is_some());
        writer.write_bit(self.time_stamp.is_some());
        writer.write_bit(!self.enabled_lanes.is_empty());
        writer.write_bit(!self.maneuver_assist_list.is_empty());
        writer.write_bit(!self.regional.is_empty());
        if let Some(name) = &self.name {
            write_name(writer, "IntersectionState.name", name)?;
        }
        self.id.encode_uper(writer)?;
        writer.write_constrained("revision", i64::from(self.revision), 0, 127)?;
        writer.write_bits(u64::from(self.status), 16);
        write_optional(writer, "moy", self.moy, MINUTE_OF_YEAR_MAX)?;
        write_optional(writer, "timeStamp", self.time_stamp, 65_535)?;
        if !self.enabled_lanes.is_empty() {
            encode_list(
                writer,
                "enabledLanes",
                &self.enabled_lanes,
                1,
                MAX_LIST_16,
                |w, lane| w.write_constrained("LaneID", i64::from(*lane), 0, 255),
            )?;
        }
        encode_list(writer, "states", &self.states, 1, MAX_MOVEMENTS, |w, m| {
            m.encode_uper(w)
        })?;
        if !self.maneuver_assist_list.is_empty() {
            encode_list(
                writer,
                "maneuverAssistList",
                &self.maneuver_assist_list,
                1,
                MAX_LIST_16,
                |w, a| a.encode_uper(w),
            )?;
        }
        if !self.regional.is_empty() {
            encode_regional(writer, &self.regional)?;
        }
        Ok(())
    }
}

impl UperMessage for IntersectionReferenceId {
    fn decode_uper(cursor: &mut UperCursor<'_>) -> CoreResult<Self> {
        let has_region = cursor.read_bit()?;
        let region = read_optional(has_region, cursor, |c| read_u16(c, 65_535))?;
        let id = read_u16(cursor, 65_535)?;
        Ok(IntersectionReferenceId { region, id })
    }

    fn encode_uper(&self, writer: &mut UperWriter) -> CoreResult<()> {
        writer.write_bit(self.region.is_some());
        write_optional(writer, "region", self.region, 65_535)?;
        writer.write_constrained("IntersectionID", i64::from(self.id), 0, 65_535)
    }
}

impl UperMessage for MovementState {
    fn decode_uper(cursor: &mut UperCursor<'_>) -> CoreResult<Self> {
        let extended = cursor.read_bit()?;
        let p = cursor.read_presence(3)?;
        let movement_name = read_optional(p[0], cursor, read_name)?;
        let signal_group = read_u8(cursor, 255)?;
        let state_time_speed = decode_list(cursor, 1, MAX_EVENTS, MovementEvent::decode_uper)?;
        let maneuver_assist_list = if p[1] {
            decode_list(cursor, 1, MAX_LIST_16, ConnectionManeuverAssist::decode_uper)?
        } else {
            Vec::new()
        };
        let regional = if p[2] { decode_regional(cursor)? } else { Vec::new() };
        finish_extensions(extended, cursor, "MovementState")?;
        Ok(MovementState {
            movement_name,
            signal_group,
            state_time_speed,
            maneuver_assist_list,
            regional,
        })
    }

    fn encode_uper(&self, writer: &mut UperWriter) -> CoreResult<()> {
        writer.write_bit(false);
        writer.write_bit(self.movement_name.is_some());
        writer.write_bit(!self.maneuver_assist_list.is_empty());
        writer.write_bit(!self.regional.is_empty());
        if let Some(name) = &self.movement_name {
            write_name(writer, "movementName", name)?;
        }
        writer.write_constrained("signalGroup", i64::from(self.signal_group), 0, 255)?;
        encode_list(
            writer,
            "state-time-speed",
            &self.state_time_speed,
            1,
            MAX_EVENTS,
            |w, e| e.encode_uper(w),
        )?;
        if !self.maneuver_assist_list.is_empty() {
            encode_list(
                writer,
                "maneuverAssistList",
                &self.maneuver_assist_list,
                1,
                MAX_LIST_16,
                |w, a| a.encode_uper(w),
            )?;
        }
        if !self.regional.is_empty() {
            encode_regional(writer, &self.regional)?;
        }
        Ok(())
    }
}

impl UperMessage for MovementEvent {
    fn decode_uper(cursor: &mut UperCursor<'_>) -> CoreResult<Self> {
        let extended = cursor.read_bit()?;
        let p = cursor.read_presence(3)?;
        let code = cursor.read_enumerated(MovementPhaseState::COUNT, false)?;
        let event_state = MovementPhaseState::from_code(code)
            .ok_or_else(|| SpatError::decode("MovementPhaseState", format!("code {code}")))?;
        let timing = read_optional(p[0], cursor, TimeChangeDetails::decode_uper)?;
        let speeds = if p[1] {
            decode_list(cursor, 1, MAX_LIST_16, AdvisorySpeed::decode_uper)?
        } else {
            Vec::new()
        };
        let regional = if p[2] { decode_regional(cursor)? } else { Vec::new() };
        finish_extensions(extended, cursor, "MovementEvent")?;
        Ok(MovementEvent {
            event_state,
            timing,
            speeds,
            regional,
        })
    }

    fn encode_uper(&self, writer: &mut UperWriter) -> CoreResult<()> {
        writer.write_bit(false);
        writer.write_bit(self.timing.is_some());
        writer.write_bit(!self.speeds.is_empty());
        writer.write_bit(!self.regional.is_empty());
        writer.write_enumerated(
            "eventState",
            u32::from(self.event_state.code()),
            MovementPhaseState::COUNT,
            false,
        )?;
        if let Some(timing) = &self.timing {
            timing.encode_uper(writer)?;
        }
        if !self.speeds.is_empty() {
            encode_list(writer, "speeds", &self.speeds, 1, MAX_LIST_16, |w, s| {
                s.encode_uper(w)
            })?;
        }
        if !self.regional.is_empty() {
            encode_regional(writer, &self.regional)?;
        }
        Ok(())
    }
}

impl UperMessage for TimeChangeDetails {
    fn decode_uper(cursor: &mut UperCursor<'_>) -> CoreResult<Self> {
        let p = cursor.read_presence(5)?;
        let start_time = read_optional(p[0], cursor, |c| read_u16(c, TIME_MARK_MAX))?;
        let min_end_time = read_u16(cursor, TIME_MARK_MAX)?;
        let max_end_time = read_optional(p[1], cursor, |c| read_u16(c, TIME_MARK_MAX))?;
        let likely_time = read_optional(p[2], cursor, |c| read_u16(c, TIME_MARK_MAX))?;
        let confidence = read_optional(p[3], cursor, |c| read_u8(c, 15))?;
        let next_time = read_optional(p[4], cursor, |c| read_u16(c, TIME_MARK_MAX))?;
        Ok(TimeChangeDetails {
            start_time,
            min_end_time,
            max_end_time,
            likely_time,
            confidence,
            next_time,
        })
    }

    fn encode_uper(&self, writer: &mut UperWriter) -> CoreResult<()> {
        writer.write_bit(self.start_time.is_some());
        writer.write_bit(self.max_end_time.is_some());
        writer.write_bit(self.likely_time.is_some());
        writer.write_bit(self.confidence.is_some());
        writer.write_bit(self.next_time.is_some());
        write_optional(writer, "startTime", self.start_time, TIME_MARK_MAX)?;
        writer.write_constrained(
            "minEndTime",
            i64::from(self.min_end_time),
            0,
            TIME_MARK_MAX,
        )?;
        write_optional(writer, "maxEndTime", self.max_end_time, TIME_MARK_MAX)?;
        write_optional(writer, "likelyTime", self.likely_time, TIME_MARK_MAX)?;
        write_optional(writer, "confidence", self.confidence, 15)?;
        write_optional(writer, "nextTime", self.next_time, TIME_MARK_MAX)
    }
}

impl UperMessage for AdvisorySpeed {
    fn decode_uper(cursor: &mut UperCursor<'_>) -> CoreResult<Self> {
        let extended = cursor.read_bit()?;
        let p = cursor.read_presence(5)?;
        let speed_type = read_enumerated_u8(cursor, 4, true, "AdvisorySpeedType")?;
        let speed = read_optional(p[0], cursor, |c| read_u16(c, 500))?;
        let confidence = read_optional(p[1], cursor, |c| {
            read_enumerated_u8(c, 8, false, "SpeedConfidence")
        })?;
        let distance = read_optional(p[2], cursor, |c| read_u16(c, ZONE_LENGTH_MAX))?;
        let class = read_optional(p[3], cursor, |c| read_u8(c, 255))?;
        let regional = if p[4] { decode_regional(cursor)? } else { Vec::new() };
        finish_extensions(extended, cursor, "AdvisorySpeed")?;
        Ok(AdvisorySpeed {
            speed_type,
            speed,
            confidence,
            distance,
            class,
            regional,
        })
    }

    fn encode_uper(&self, writer: &mut UperWriter) -> CoreResult<()> {
        writer.write_bit(false);
        writer.write_bit(self.speed.is_some());
        writer.write_bit(self.confidence.is_some());
        writer.write_bit(self.distance.is_some());
        writer.write_bit(self.class.is_some());
        writer.write_bit(!self.regional.is_empty());
        writer.write_enumerated("AdvisorySpeedType", u32::from(self.speed_type), 4, true)?;
        write_optional(writer, "speed", self.speed, 500)?;
        if let Some(c) = self.confidence {
            writer.write_enumerated("SpeedConfidence", u32::from(c), 8, false)?;
        }
        write_optional(writer, "distance", self.distance, ZONE_LENGTH_MAX)?;
        write_optional(writer, "class", self.class, 255)?;
        if !self.regional.is_empty() {
            encode_regional(writer, &self.regional)?;
        }
        Ok(())
    }
}

impl UperMessage for ConnectionManeuverAssist {
    fn decode_uper(cursor: &mut UperCursor<'_>) -> CoreResult<Self> {
        let extended = cursor.read_bit()?;
        let p = cursor.read_presence(5)?;
        let connection_id = read_u8(cursor, 255)?;
        let queue_length = read_optional(p[0], cursor, |c| read_u16(c, ZONE_LENGTH_MAX))?;
        let available_storage_length =
            read_optional(p[1], cursor, |c| read_u16(c, ZONE_LENGTH_MAX))?;
        let wait_on_stop = read_optional(p[2], cursor, |c| c.read_bit())?;
        let ped_bicycle_detect = read_optional(p[3], cursor, |c| c.read_bit())?;
        let regional = if p[4] { decode_regional(cursor)? } else { Vec::new() };
        finish_extensions(extended, cursor, "ConnectionManeuverAssist")?;
        Ok(ConnectionManeuverAssist {
            connection_id,
            queue_length,
            available_storage_length,
            wait_on_stop,
            ped_bicycle_detect,
            regional,
        })
    }

    fn encode_uper(&self, writer: &mut UperWriter) -> CoreResult<()> {
        writer.write_bit(false);
        writer.write_bit(self.queue_length.is_some());
        writer.write_bit(self.available_storage_length.is_some());
        writer.write_bit(self.wait_on_stop.is_some());
        writer.write_bit(self.ped_bicycle_detect.is_some());
        writer.write_bit(!self.regional.is_empty());
        writer.write_constrained("connectionID", i64::from(self.connection_id), 0, 255)?;
        write_optional(writer, "queueLength", self.queue_length, ZONE_LENGTH_MAX)?;
        write_optional(
            writer,
            "availableStorageLength",
            self.available_storage_length,
            ZONE_LENGTH_MAX,
        )?;
        if let Some(b) = self.wait_on_stop {
            writer.write_bit(b);
        }
        if let Some(b) = self.ped_bicycle_detect {
            writer.write_bit(b);
        }
        if !self.regional.is_empty() {
            encode_regional(writer, &self.regional)?;
        }
        Ok(())
    }
}

impl UperMessage for RegionalExtension {
    fn decode_uper(cursor: &mut UperCursor<'_>) -> CoreResult<Self> {
        let region_id = read_u8(cursor, 255)?;
        let value = cursor.read_open_type()?;
        Ok(RegionalExtension { region_id, value })
    }

    fn encode_uper(&self, writer: &mut UperWriter) -> CoreResult<()> {
        writer.write_constrained("RegionId", i64::from(self.region_id), 0, 255)?;
        writer.write_open_type(&self.value)
    }
}
