//! Bit-level primitives: LSB-first field reads and writes, unary zero runs,
//! and packing a bit stream into/out of an integer.
//!
//! The convention everywhere: the first bit consumed or emitted is bit 0
//! (least significant) of the field's value, the second is bit 1, and so on.
//! This is *not* a byte-oriented big-endian read, hence the explicit `Lsb0`
//! backing and `load_le`/`store_le` throughout.

use bitvec::field::BitField;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::CueError;
use crate::{NounBitSlice, NounBitVec};

/// Cursor over a bit stream.
///
/// The buffer is never modified, just the position moves, so a failed read
/// leaves no trace beyond the bits already consumed by earlier reads.
///
/// # Example
/// ```rust
/// use jamcue::bits::BitReader;
/// use jamcue::NounBitVec;
/// let mut bv = NounBitVec::new();
/// jamcue::bits::write_field(&mut bv, 6, 4);
/// let mut r = BitReader::new(&bv);
/// assert_eq!(r.read_field(4).unwrap(), 6);
/// assert!(r.is_exhausted());
/// ```
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a NounBitSlice,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Start reading at bit 0 of `buffer`.
    pub fn new(buffer: &'a NounBitSlice) -> Self {
        BitReader { buffer, pos: 0 }
    }

    /// Current bit offset from the start of the stream.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Bits left to consume.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }

    /// Has every bit been consumed?
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.buffer.len()
    }

    /// Consume a single bit.
    pub fn read_bit(&mut self) -> Result<bool, CueError> {
        let bit = self.buffer.get(self.pos).map(|b| *b).ok_or(CueError::OutOfBits)?;
        self.pos += 1;
        Ok(bit)
    }

    /// Consume `width` bits (at most 64) as an unsigned integer, first bit
    /// least significant.
    pub fn read_field(&mut self, width: usize) -> Result<u64, CueError> {
        debug_assert!(width <= 64, "read_field is limited to 64 bits");
        if width > self.remaining() {
            return Err(CueError::OutOfBits);
        }
        if width == 0 {
            return Ok(0);
        }
        let value = self.buffer[self.pos..self.pos + width].load_le::<u64>();
        self.pos += width;
        Ok(value)
    }

    /// Consume `width` bits of any size, first bit least significant.
    pub fn read_wide_field(&mut self, width: usize) -> Result<BigUint, CueError> {
        if width > self.remaining() {
            return Err(CueError::OutOfBits);
        }
        let mut value = BigUint::zero();
        let field = &self.buffer[self.pos..self.pos + width];
        for (i, chunk) in field.chunks(64).enumerate() {
            let limb = chunk.load_le::<u64>();
            if limb != 0 {
                value |= BigUint::from(limb) << (64 * i);
            }
        }
        self.pos += width;
        Ok(value)
    }

    /// Count consecutive 0 bits, then consume the terminating 1 bit. The
    /// terminator is consumed but not counted.
    pub fn read_zero_run(&mut self) -> Result<usize, CueError> {
        let run = self.buffer[self.pos..].first_one().ok_or(CueError::OutOfBits)?;
        self.pos += run + 1;
        Ok(run)
    }
}

/// Append the low `width` bits of `value`, least significant first.
///
/// `value` must fit in `width` bits; call sites precompute a sufficient
/// width, so this is not checked in release builds.
pub fn write_field(bv: &mut NounBitVec, value: u64, width: usize) {
    debug_assert!(width <= 64, "write_field is limited to 64 bits");
    debug_assert!(width == 64 || value >> width == 0, "value must fit in width");
    if width == 0 {
        return;
    }
    let start = bv.len();
    bv.resize(start + width, false);
    bv[start..].store_le(value);
}

/// Append the low `width` bits of `value`, least significant first.
pub fn write_wide_field(bv: &mut NounBitVec, value: &BigUint, width: usize) {
    let start = bv.len();
    bv.resize(start + width, false);
    let field = &mut bv[start..];
    for (i, limb) in value.iter_u64_digits().enumerate() {
        let lo = 64 * i;
        if lo >= width {
            break;
        }
        let hi = (lo + 64).min(width);
        // store_le keeps only as many low bits of the limb as the slice holds
        field[lo..hi].store_le(limb);
    }
}

/// Unpack an integer into its minimal-length bit stream (bit `i` of `n`
/// becomes stream bit `i`). The implicit leading zeros of `n` are not part
/// of the stream.
pub fn unpack(n: &BigUint) -> NounBitVec {
    let mut bits = NounBitVec::from_vec(n.to_bytes_le());
    bits.truncate(n.bits() as usize);
    bits
}

/// Pack a bit stream into an integer, first bit least significant.
pub fn pack(mut bits: NounBitVec) -> BigUint {
    bits.set_uninitialized(false);
    BigUint::from_bytes_le(&bits.into_vec())
}
