// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! UPER cursor for reading unaligned PER (ITU-T X.691 UNALIGNED) data.
//!
//! Unlike the byte-oriented readers elsewhere in the crate, PER packs fields
//! at bit granularity: a constrained integer occupies exactly the number of
//! bits needed for its range, optional fields are announced by a presence
//! bitmap, and nothing is padded to an octet boundary except the complete
//! encoding.

use bitvec::prelude::*;

use crate::{Result as CoreResult, SpatError};

/// Number of bits needed to encode any value of a range of size `range + 1`.
///
/// A range of zero (`lb == ub`) needs no bits at all.
#[inline]
pub fn bits_for_range(range: u64) -> u32 {
    if range == 0 {
        0
    } else {
        64 - range.leading_zeros()
    }
}

/// Value of up to 64 bits read most significant first.
fn msb_value(bits: &BitSlice<u8, Msb0>) -> u64 {
    bits.iter()
        .by_vals()
        .fold(0u64, |value, bit| (value << 1) | u64::from(bit))
}

/// UPER cursor that tracks a bit position into a byte buffer.
///
/// Bits are consumed MSB-first within each octet.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use spat_relay::encoding::uper::UperCursor;
///
/// // messageId INTEGER (0..32767) preceded by an extension bit
/// let data = [0x00, 0x13];
/// let mut cursor = UperCursor::new(&data);
/// assert!(!cursor.read_bit()?);
/// assert_eq!(cursor.read_constrained(0, 32767)?, 19);
/// # Ok(())
/// # }
/// ```
pub struct UperCursor<'a> {
    /// The encoded buffer viewed as MSB-first bits
    data: &'a BitSlice<u8, Msb0>,
    /// Current read position in bits
    bit_pos: usize,
}

impl<'a> UperCursor<'a> {
    /// Create a cursor positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data: data.view_bits::<Msb0>(),
            bit_pos: 0,
        }
    }

    /// Current position in bits.
    #[inline]
    pub fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Bits left to read.
    #[inline]
    pub fn remaining_bits(&self) -> usize {
        self.data.len().saturating_sub(self.bit_pos)
    }

    /// Check if every bit has been consumed.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.remaining_bits() == 0
    }

    fn ensure(&self, bits: usize) -> CoreResult<()> {
        if bits > self.remaining_bits() {
            return Err(SpatError::buffer_too_short(
                bits,
                self.remaining_bits(),
                self.bit_pos,
            ));
        }
        Ok(())
    }

    /// Take the next `count` bits as a slice and advance past them.
    fn take(&mut self, count: usize) -> CoreResult<&'a BitSlice<u8, Msb0>> {
        self.ensure(count)?;
        let data = self.data;
        let bits = &data[self.bit_pos..self.bit_pos + count];
        self.bit_pos += count;
        Ok(bits)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> CoreResult<bool> {
        Ok(self.take(1)?[0])
    }

    /// Read `count` bits (at most 64) as an unsigned big-endian number.
    pub fn read_bits(&mut self, count: u32) -> CoreResult<u64> {
        if count > 64 {
            return Err(SpatError::decode(
                "UPER",
                format!("cannot read {count} bits into a 64-bit value"),
            ));
        }
        Ok(msb_value(self.take(count as usize)?))
    }

    /// Read a constrained whole number in `lower..=upper` (X.691 §11.5).
    pub fn read_constrained(&mut self, lower: i64, upper: i64) -> CoreResult<i64> {
        let range = (upper - lower) as u64;
        let offset = self.read_bits(bits_for_range(range))?;
        if offset > range {
            return Err(SpatError::constraint(
                "constrained whole number",
                lower + offset as i64,
                lower,
                upper,
            ));
        }
        Ok(lower + offset as i64)
    }

    /// Read a constrained size (SEQUENCE OF count, string length).
    pub fn read_size(&mut self, lower: usize, upper: usize) -> CoreResult<usize> {
        Ok(self.read_constrained(lower as i64, upper as i64)? as usize)
    }

    /// Read an unconstrained length determinant (X.691 §11.9.3.6).
    ///
    /// Fragmented lengths (16K and above) are not used by any J2735 message
    /// this crate handles and are rejected.
    pub fn read_length(&mut self) -> CoreResult<usize> {
        if !self.read_bit()? {
            return Ok(self.read_bits(7)? as usize);
        }
        if !self.read_bit()? {
            return Ok(self.read_bits(14)? as usize);
        }
        Err(SpatError::decode(
            "UPER",
            format!("fragmented length at bit {}", self.bit_pos),
        ))
    }

    /// Read a normally small non-negative whole number (X.691 §11.6).
    pub fn read_normally_small(&mut self) -> CoreResult<u64> {
        if !self.read_bit()? {
            return self.read_bits(6);
        }
        let len = self.read_length()?;
        if len == 0 || len > 8 {
            return Err(SpatError::decode(
                "UPER",
                format!("normally small number of {len} octets"),
            ));
        }
        self.read_bits(len as u32 * 8)
    }

    /// Read `count` whole octets starting at the current (possibly unaligned) bit.
    pub fn read_octets(&mut self, count: usize) -> CoreResult<Vec<u8>> {
        let bits = self.take(count * 8)?;
        Ok(bits.chunks(8).map(|octet| msb_value(octet) as u8).collect())
    }

    /// Read an open type: unconstrained length followed by that many octets.
    pub fn read_open_type(&mut self) -> CoreResult<Vec<u8>> {
        let len = self.read_length()?;
        self.read_octets(len)
    }

    /// Read an IA5String with a size constraint; each character is 7 bits.
    pub fn read_ia5_string(&mut self, lower: usize, upper: usize) -> CoreResult<String> {
        let len = self.read_size(lower, upper)?;
        let bits = self.take(len * 7)?;
        Ok(bits
            .chunks(7)
            .map(|c| char::from(msb_value(c) as u8))
            .collect())
    }

    /// Read a fixed-size BIT STRING of `bits` bits as an unsigned number.
    pub fn read_fixed_bit_string(&mut self, bits: u32) -> CoreResult<u64> {
        self.read_bits(bits)
    }

    /// Read an ENUMERATED index (X.691 §14).
    ///
    /// Returns the index into the root enumeration, or `root_count + n` for the
    /// n-th extension addition when the type is extensible.
    pub fn read_enumerated(&mut self, root_count: u32, extensible: bool) -> CoreResult<u32> {
        if extensible && self.read_bit()? {
            let extension = self.read_normally_small()?;
            return u32::try_from(extension)
                .ok()
                .and_then(|n| root_count.checked_add(n))
                .ok_or_else(|| {
                    SpatError::decode(
                        "UPER",
                        format!("enumerated extension index {extension} out of range"),
                    )
                });
        }
        let index = self.read_constrained(0, i64::from(root_count) - 1)?;
        Ok(index as u32)
    }

    /// Read a presence bitmap for `count` OPTIONAL/DEFAULT components.
    pub fn read_presence(&mut self, count: usize) -> CoreResult<Vec<bool>> {
        (0..count).map(|_| self.read_bit()).collect()
    }

    /// Skip the extension additions of a SEQUENCE whose extension bit was set.
    ///
    /// Additions are encoded as a normally small length bitmap followed by one
    /// open type per present addition. Returns how many were skipped.
    pub fn skip_extensions(&mut self) -> CoreResult<usize> {
        if self.read_bit()? {
            return Err(SpatError::decode(
                "UPER",
                "more than 64 extension additions",
            ));
        }
        let count = self.read_bits(6)? as usize + 1;
        let present = self.read_presence(count)?;
        let mut skipped = 0;
        for _ in present.into_iter().filter(|p| *p) {
            let len = self.read_length()?;
            self.take(len * 8)?;
            skipped += 1;
        }
        Ok(skipped)
    }
}
