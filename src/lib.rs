//! Bit-exact jam/cue codec for nouns (binary trees of arbitrary-precision atoms).
//!
//! A *noun* is either an atom (a nonnegative integer) or a cell (an ordered
//! pair of nouns). [`jam`] serializes a noun into a compact bit sequence,
//! packed into a [`BigUint`](num_bigint::BigUint); [`cue`] is the inverse.
//! Repeated subtrees are deduplicated: instead of re-emitting an already
//! serialized subtree, the encoder may emit a back-reference to the bit
//! offset of its first occurrence, whenever that is at least as small.
//!
//! # Overview
//! Bits are consumed and emitted least-significant-first: the first bit of
//! the stream is bit 0 of the packed integer. Every node starts with a tag:
//!
//! * `0`: atom, followed by the length-prefixed value (see below)
//! * `10`: cell, followed by the head's encoding, then the tail's
//! * `11`: back-reference, followed by the length-prefixed bit offset of an
//!   earlier occurrence of an equal noun
//!
//! Atom values and back-reference offsets share one integer encoding: a unary
//! run of zeros gives the bit-length of the bit-length (`LL`), the next
//! `LL - 1` bits give the bit-length with its implicit leading 1 stripped,
//! and the value's own bits follow. The integer 0 is just the `1` terminator.
//!
//! # Note
//! The wire format carries no end marker and no length field: the minimal
//! bit-length of the packed integer defines where the stream ends. A caller
//! transporting the encoding as raw bytes must also transport (or re-derive)
//! that bit-length.
//!
//! # Example
//! ```rust
//! use jamcue::{cue, jam, Noun};
//!
//! let noun = Noun::cell(Noun::atom(1u8), Noun::cell(Noun::atom(2u8), Noun::atom(3u8)));
//! let packed = jam(&noun);
//! let back = cue(&packed).unwrap();
//! assert_eq!(*back, noun);
//!
//! // the canonical two-bit encoding of the atom 0
//! assert_eq!(jam(&Noun::atom(0u8)), 2u8.into());
//! ```
#![deny(missing_docs)]
pub mod bits;
pub mod cue;
pub mod error;
pub mod jam;
pub mod noun;
pub mod uint;

pub use crate::cue::{cue, cue_bits};
pub use crate::error::CueError;
pub use crate::jam::{jam, jam_to_bits};
pub use crate::noun::Noun;

use bitvec::prelude as bv;

/// The bit-slice type used throughout the crate.
///
/// `Lsb0` ordering makes stream bit `i` coincide with bit `i` of the packed
/// integer, so packing/unpacking is a plain byte copy.
pub type NounBitSlice = bv::BitSlice<u8, bv::Lsb0>;
/// Owned variant of [`NounBitSlice`].
pub type NounBitVec = bv::BitVec<u8, bv::Lsb0>;
