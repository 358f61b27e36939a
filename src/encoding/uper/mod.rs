// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Unaligned PER (UPER) primitives.
//!
//! This module provides the bit-level building blocks used by the J2735
//! message codecs:
//! - [`UperCursor`] - Reads constrained integers, lengths, strings, open types
//! - [`UperWriter`] - Writes the same primitives

pub mod cursor;
pub mod writer;

pub use cursor::{bits_for_range, UperCursor};
pub use writer::UperWriter;
