// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Movement phase states (J2735 `MovementPhaseState`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Signal phase of a movement.
///
/// The numeric codes are the ENUMERATED indices from the DSRC schema and are
/// what the relay forwards downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum MovementPhaseState {
    #[default]
    Unavailable = 0,
    Dark = 1,
    StopThenProceed = 2,
    StopAndRemain = 3,
    PreMovement = 4,
    PermissiveMovementAllowed = 5,
    ProtectedMovementAllowed = 6,
    PermissiveClearance = 7,
    ProtectedClearance = 8,
    CautionConflictingTraffic = 9,
}

/// Coarse signal head colour used for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalColor {
    Red,
    Yellow,
    Green,
    Dark,
    Unknown,
}

impl MovementPhaseState {
    /// Number of root enumerations.
    pub const COUNT: u32 = 10;

    /// Look up a phase by its ENUMERATED index.
    pub fn from_code(code: u32) -> Option<Self> {
        use MovementPhaseState::*;
        Some(match code {
            0 => Unavailable,
            1 => Dark,
            2 => StopThenProceed,
            3 => StopAndRemain,
            4 => PreMovement,
            5 => PermissiveMovementAllowed,
            6 => ProtectedMovementAllowed,
            7 => PermissiveClearance,
            8 => ProtectedClearance,
            9 => CautionConflictingTraffic,
            _ => return None,
        })
    }

    /// The ENUMERATED index.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Schema name of the phase.
    pub fn as_str(self) -> &'static str {
        use MovementPhaseState::*;
        match self {
            Unavailable => "unavailable",
            Dark => "dark",
            StopThenProceed => "stop-Then-Proceed",
            StopAndRemain => "stop-And-Remain",
            PreMovement => "pre-Movement",
            PermissiveMovementAllowed => "permissive-Movement-Allowed",
            ProtectedMovementAllowed => "protected-Movement-Allowed",
            PermissiveClearance => "permissive-clearance",
            ProtectedClearance => "protected-clearance",
            CautionConflictingTraffic => "caution-Conflicting-Traffic",
        }
    }

    /// Colour a driver would see for this phase.
    pub fn color(self) -> SignalColor {
        use MovementPhaseState::*;
        match self {
            StopThenProceed | StopAndRemain => SignalColor::Red,
            PreMovement | PermissiveMovementAllowed | ProtectedMovementAllowed => {
                SignalColor::Green
            }
            PermissiveClearance | ProtectedClearance => SignalColor::Yellow,
            Dark => SignalColor::Dark,
            Unavailable | CautionConflictingTraffic => SignalColor::Unknown,
        }
    }
}

impl fmt::Display for MovementPhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.as_str(), self.code())
    }
}

impl fmt::Display for SignalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalColor::Red => "RED",
            SignalColor::Yellow => "YELLOW",
            SignalColor::Green => "GREEN",
            SignalColor::Dark => "DARK",
            SignalColor::Unknown => "-",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for code in 0..MovementPhaseState::COUNT {
            let phase = MovementPhaseState::from_code(code).unwrap();
            assert_eq!(u32::from(phase.code()), code);
        }
        assert_eq!(MovementPhaseState::from_code(10), None);
    }

    #[test]
    fn test_reference_colors() {
        assert_eq!(MovementPhaseState::StopAndRemain.color(), SignalColor::Red);
        assert_eq!(
            MovementPhaseState::PermissiveMovementAllowed.color(),
            SignalColor::Green
        );
        assert_eq!(
            MovementPhaseState::ProtectedClearance.color(),
            SignalColor::Yellow
        );
        assert_eq!(MovementPhaseState::Unavailable.color(), SignalColor::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            MovementPhaseState::StopAndRemain.to_string(),
            "stop-And-Remain(3)"
        );
    }
}
