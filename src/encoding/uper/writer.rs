// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! UPER writer producing unaligned PER bit streams.

use bitvec::prelude::*;

use super::cursor::bits_for_range;
use crate::{Result as CoreResult, SpatError};

/// Bit-granular output buffer for unaligned PER.
///
/// The complete encoding is padded with zero bits to an octet boundary by
/// [`into_bytes`](Self::into_bytes); an empty encoding yields a single zero
/// octet (X.691 §11.1).
#[derive(Debug, Default, Clone)]
pub struct UperWriter {
    buf: BitVec<u8, Msb0>,
}

impl UperWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.buf.len()
    }

    /// Finish the encoding, padding the last octet with zero bits.
    pub fn into_bytes(mut self) -> Vec<u8> {
        if self.buf.is_empty() {
            return vec![0];
        }
        while self.buf.len() % 8 != 0 {
            self.buf.push(false);
        }
        self.buf.into_vec()
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.buf.push(bit);
    }

    /// Write the low `count` bits (at most 64) of `value`, MSB first.
    pub fn write_bits(&mut self, value: u64, count: u32) {
        let count = count.min(64) as usize;
        let bits = value.view_bits::<Msb0>();
        self.buf.extend_from_bitslice(&bits[64 - count..]);
    }

    /// Write a constrained whole number in `lower..=upper`.
    pub fn write_constrained(
        &mut self,
        field: &str,
        value: i64,
        lower: i64,
        upper: i64,
    ) -> CoreResult<()> {
        if value < lower || value > upper {
            return Err(SpatError::constraint(field, value, lower, upper));
        }
        let range = (upper - lower) as u64;
        self.write_bits((value - lower) as u64, bits_for_range(range));
        Ok(())
    }

    /// Write a constrained size.
    pub fn write_size(
        &mut self,
        field: &str,
        len: usize,
        lower: usize,
        upper: usize,
    ) -> CoreResult<()> {
        self.write_constrained(field, len as i64, lower as i64, upper as i64)
    }

    /// Write an unconstrained length determinant.
    pub fn write_length(&mut self, len: usize) -> CoreResult<()> {
        if len < 128 {
            self.write_bit(false);
            self.write_bits(len as u64, 7);
            Ok(())
        } else if len < 16384 {
            self.write_bits(0b10, 2);
            self.write_bits(len as u64, 14);
            Ok(())
        } else {
            Err(SpatError::encode(
                "UPER",
                format!("length {len} needs fragmentation"),
            ))
        }
    }

    /// Write whole octets at the current bit position.
    pub fn write_octets(&mut self, bytes: &[u8]) {
        self.buf.extend_from_bitslice(bytes.view_bits::<Msb0>());
    }

    /// Write an open type from an already complete encoding.
    pub fn write_open_type(&mut self, encoded: &[u8]) -> CoreResult<()> {
        self.write_length(encoded.len())?;
        self.write_octets(encoded);
        Ok(())
    }

    /// Write an IA5String with a size constraint.
    pub fn write_ia5_string(
        &mut self,
        field: &str,
        s: &str,
        lower: usize,
        upper: usize,
    ) -> CoreResult<()> {
        if !s.is_ascii() {
            return Err(SpatError::encode(field, "IA5String must be ASCII"));
        }
        self.write_size(field, s.len(), lower, upper)?;
        for b in s.bytes() {
            self.write_bits(u64::from(b), 7);
        }
        Ok(())
    }

    /// Write a root ENUMERATED index.
    pub fn write_enumerated(
        &mut self,
        field: &str,
        index: u32,
        root_count: u32,
        extensible: bool,
    ) -> CoreResult<()> {
        if extensible {
            self.write_bit(false);
        }
        self.write_constrained(field, i64::from(index), 0, i64::from(root_count) - 1)
    }
}
