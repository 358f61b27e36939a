// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout spat-relay.
//!
//! This module provides the foundational types for the library:
//! - [`SpatError`] - Error taxonomy for the relay pipeline
//! - [`MatchScope`] - Which tracked slots an event may update
//! - [`WireFormat`] - Outbound summary encoding identifier

pub mod error;

pub use error::{Result, SpatError};

use serde::{Deserialize, Serialize};

/// Which tracked slots are eligible when a movement event is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchScope {
    /// Only the slot of the intersection currently being walked
    #[default]
    Intersection,
    /// Every slot marked earlier in the same cycle
    Cycle,
}

/// Outbound summary encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Magic + version header followed by fixed-width records
    #[default]
    Versioned,
    /// Fixed 1024-byte slot layout read by existing consumers
    Legacy,
}

/// Error returned when parsing a [`MatchScope`] or [`WireFormat`] from string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNameError {
    expected: &'static str,
}

impl std::fmt::Display for ParseNameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid name, expected {}", self.expected)
    }
}

impl std::error::Error for ParseNameError {}

impl std::str::FromStr for MatchScope {
    type Err = ParseNameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "intersection" => Ok(MatchScope::Intersection),
            "cycle" => Ok(MatchScope::Cycle),
            _ => Err(ParseNameError {
                expected: "'intersection' or 'cycle'",
            }),
        }
    }
}

impl std::str::FromStr for WireFormat {
    type Err = ParseNameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "versioned" => Ok(WireFormat::Versioned),
            "legacy" => Ok(WireFormat::Legacy),
            _ => Err(ParseNameError {
                expected: "'versioned' or 'legacy'",
            }),
        }
    }
}

impl MatchScope {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchScope::Intersection => "intersection",
            MatchScope::Cycle => "cycle",
        }
    }
}

impl WireFormat {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Versioned => "versioned",
            WireFormat::Legacy => "legacy",
        }
    }
}
