// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Relay configuration.
//!
//! Loaded from TOML. Every field has a default matching the reference
//! deployment, so an empty file configures the stock relay:
//!
//! ```toml
//! listen = "192.168.1.3:60000"
//! forward_to = "127.0.0.1:50000"
//! source = "0.0.0.0:55555"
//! receive_timeout_ms = 500
//!
//! [frame]
//! prefix_len = 16
//! tag_offset = 17
//! tag = 0x13
//! max_datagram = 1024
//!
//! [aggregate]
//! match_scope = "intersection"
//! table_capacity = 11
//!
//! [[aggregate.track]]
//! intersection_id = 200
//! signal_group = 1
//!
//! [wire]
//! format = "versioned"
//! ```

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aggregate::{
    Aggregator, AllowList, TrackedIntersection, DEFAULT_TABLE_CAPACITY, REFERENCE_TRACKED,
};
use crate::core::{MatchScope, WireFormat};
use crate::frame::{FrameConfig, FrameGate};
use crate::{Result, SpatError};

/// Default listen address of the reference deployment.
pub const DEFAULT_LISTEN: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 3), 60000));
/// Default downstream consumer.
pub const DEFAULT_FORWARD_TO: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 50000));
/// Default local address of the forward socket.
pub const DEFAULT_SOURCE: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 55555));

/// Full relay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// Address receiving SPAT datagrams
    pub listen: SocketAddr,
    /// Downstream consumer of summaries
    pub forward_to: SocketAddr,
    /// Local address the forward socket binds
    pub source: SocketAddr,
    /// Receive timeout; blocking when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_timeout_ms: Option<u64>,
    pub frame: FrameConfig,
    pub aggregate: AggregateConfig,
    pub wire: WireConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN,
            forward_to: DEFAULT_FORWARD_TO,
            source: DEFAULT_SOURCE,
            receive_timeout_ms: None,
            frame: FrameConfig::default(),
            aggregate: AggregateConfig::default(),
            wire: WireConfig::default(),
        }
    }
}

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregateConfig {
    pub match_scope: MatchScope,
    pub table_capacity: usize,
    /// Tracked intersections; list position is the table slot
    pub track: Vec<TrackedIntersection>,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            match_scope: MatchScope::default(),
            table_capacity: DEFAULT_TABLE_CAPACITY,
            track: REFERENCE_TRACKED
                .iter()
                .map(|&(id, group)| TrackedIntersection::new(id, group))
                .collect(),
        }
    }
}

/// Outbound encoding settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WireConfig {
    pub format: WireFormat,
}

impl RelayConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: RelayConfig =
            toml::from_str(text).map_err(|e| SpatError::invalid_config("toml", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SpatError::invalid_config(path.display().to_string(), e.to_string())
        })?;
        Self::from_toml(&text)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SpatError::encode("config", e.to_string()))
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        let track = &self.aggregate.track;
        if track.is_empty() {
            return Err(SpatError::invalid_config(
                "aggregate.track",
                "at least one tracked intersection is required",
            ));
        }
        self.allow_list()?;
        if track.len() > self.aggregate.table_capacity {
            return Err(SpatError::invalid_config(
                "aggregate.table_capacity",
                format!(
                    "{} tracked intersections exceed capacity {}",
                    track.len(),
                    self.aggregate.table_capacity
                ),
            ));
        }
        if self.frame.prefix_len > self.frame.max_datagram {
            return Err(SpatError::invalid_config(
                "frame.prefix_len",
                format!(
                    "prefix of {} bytes exceeds max_datagram {}",
                    self.frame.prefix_len, self.frame.max_datagram
                ),
            ));
        }
        if self.frame.tag_offset >= self.frame.max_datagram {
            return Err(SpatError::invalid_config(
                "frame.tag_offset",
                format!(
                    "offset {} lies outside max_datagram {}",
                    self.frame.tag_offset, self.frame.max_datagram
                ),
            ));
        }
        if self.receive_timeout_ms == Some(0) {
            return Err(SpatError::invalid_config(
                "receive_timeout_ms",
                "must be positive; omit it for a blocking receive",
            ));
        }
        Ok(())
    }

    /// Receive timeout, if configured.
    pub fn receive_timeout(&self) -> Option<Duration> {
        self.receive_timeout_ms.map(Duration::from_millis)
    }

    /// Build the frame gate.
    pub fn gate(&self) -> FrameGate {
        FrameGate::new(&self.frame)
    }

    /// Build the allow-list.
    pub fn allow_list(&self) -> Result<AllowList> {
        AllowList::new(self.aggregate.track.clone())
    }

    /// Build the aggregator.
    pub fn aggregator(&self) -> Result<Aggregator> {
        Aggregator::new(
            self.allow_list()?,
            self.aggregate.match_scope,
            self.aggregate.table_capacity,
        )
    }
}
