// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encoding and decoding.
//!
//! - [`uper`] - Unaligned PER bit-level primitives
//! - [`codec`] - The [`MessageDecoder`] interface and its UPER implementation

pub mod codec;
pub mod uper;

pub use codec::{MessageDecoder, UperDecoder};
pub use uper::{UperCursor, UperWriter};
