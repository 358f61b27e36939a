// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::path::Path;

use anyhow::Context as _;
use chrono::{Datelike, Duration, TimeZone, Utc};
use tracing_subscriber::{fmt, EnvFilter};

use spat_relay::j2735::{MINUTE_OF_YEAR_UNKNOWN, TIME_MARK_UNKNOWN};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Install the stderr log subscriber.
///
/// `--log-level` wins over `RUST_LOG`; the fallback is `info`.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level: {level}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}

/// Read a captured payload, either raw bytes or hex text.
///
/// Hex input may contain whitespace and line breaks.
pub fn read_input(path: &Path, hex_text: bool) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if !hex_text {
        return Ok(bytes);
    }
    let digits: Vec<u8> = bytes
        .into_iter()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    hex::decode(&digits).with_context(|| format!("{} is not valid hex", path.display()))
}

/// Format a MinuteOfTheYear value against the given year.
pub fn format_minute_of_year(moy: u32, year: i32) -> String {
    if moy >= MINUTE_OF_YEAR_UNKNOWN {
        return "unknown".to_string();
    }
    match Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single() {
        Some(start) => (start + Duration::minutes(i64::from(moy)))
            .format("%m-%d %H:%M UTC")
            .to_string(),
        None => format!("minute {moy}"),
    }
}

/// Format a MinuteOfTheYear value against the current year.
pub fn format_moy_now(moy: u32) -> String {
    format_minute_of_year(moy, Utc::now().year())
}

/// Format a DSecond value (milliseconds within the minute).
pub fn format_dsecond(ms: u16) -> String {
    if ms >= 60_000 {
        return "unknown".to_string();
    }
    format!("{}.{:03}s", ms / 1000, ms % 1000)
}

/// Format a TimeMark value (tenths of a second within the hour).
pub fn format_time_mark(mark: u16) -> String {
    if mark >= TIME_MARK_UNKNOWN {
        return "unknown".to_string();
    }
    if mark == 36_000 {
        return "leap".to_string();
    }
    format!("{:02}:{:02}.{}", mark / 600, (mark % 600) / 10, mark % 10)
}
