//! Length-prefixed integer codec, shared by atom values and back-reference
//! offsets.
//!
//! Framing for a value `n > 0` with `L = bit_length(n)` and
//! `LL = bit_length(L)`:
//!
//! ```text
//! 0…0 1 | low LL-1 bits of L | low L bits of n
//!  LL
//! ```
//!
//! The top bit of a nonzero length is always 1, so it is never stored; the
//! decoder reinstates it. The value 0 is the bare `1` terminator (a unary run
//! of length zero, nothing else).
//!
//! # Example
//! ```rust
//! use jamcue::bits::BitReader;
//! use jamcue::{uint, NounBitVec};
//! use num_bigint::BigUint;
//!
//! let mut bv = NounBitVec::new();
//! uint::encode(&mut bv, &BigUint::from(5u8));
//! assert_eq!(bv.len(), uint::cost(&BigUint::from(5u8)));
//!
//! let mut r = BitReader::new(&bv);
//! assert_eq!(uint::decode(&mut r).unwrap(), BigUint::from(5u8));
//! ```

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bits::{self, BitReader};
use crate::error::CueError;
use crate::NounBitVec;

/// Decode one length-prefixed integer from the stream.
pub fn decode(r: &mut BitReader) -> Result<BigUint, CueError> {
    let ll = r.read_zero_run()?;
    if ll == 0 {
        return Ok(BigUint::zero());
    }
    let partial = r.read_wide_field(ll - 1)?;
    let len = (BigUint::one() << (ll - 1)) | partial;
    // a length the stream cannot possibly hold is just a truncated input
    let len = usize::try_from(&len).map_err(|_| CueError::OutOfBits)?;
    r.read_wide_field(len)
}

/// Append the encoding of `n` to `bv`. Emits exactly [`cost`]`(n)` bits.
pub fn encode(bv: &mut NounBitVec, n: &BigUint) {
    if n.is_zero() {
        bv.push(true);
        return;
    }
    let len = n.bits();
    let ll = bit_length(len);
    for _ in 0..ll {
        bv.push(false);
    }
    bv.push(true);
    // the length, with its implicit leading 1 stripped
    bits::write_field(bv, len ^ (1 << (ll - 1)), (ll - 1) as usize);
    bits::write_wide_field(bv, n, len as usize);
}

/// Exact bit count [`encode`] emits for `n`, without emitting: `2*LL + L`
/// for nonzero `n`, 1 bit for zero.
pub fn cost(n: &BigUint) -> usize {
    if n.is_zero() {
        return 1;
    }
    let len = n.bits();
    (2 * bit_length(len) + len) as usize
}

fn bit_length(x: u64) -> u64 {
    u64::from(u64::BITS - x.leading_zeros())
}
