//! Decode-side error taxonomy. Encoding a finite noun never fails.

use num_bigint::BigUint;
use thiserror::Error;

/// Everything that can go wrong while cueing a bit stream.
///
/// All variants are unrecoverable for the call in which they occur: there is
/// no partial decode result and nothing to retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CueError {
    /// The stream ran out of bits while a field or a unary run terminator was
    /// still expected. The input is truncated or was never a valid encoding.
    #[error("bit stream exhausted mid-field")]
    OutOfBits,

    /// A back-reference resolved to an offset that is not the start of an
    /// already fully decoded node. Covers self- and forward-references as
    /// well as offsets landing in the middle of a node's encoding.
    #[error("back-reference to offset {0}, which is not a completed node start")]
    DanglingBackref(BigUint),

    /// Bits remained after one complete noun was decoded. The format has no
    /// end marker, so leftover bits mean the supplied length was wrong.
    #[error("{consumed} of {length} bits consumed, trailing bits after a complete noun")]
    TrailingBits {
        /// Bits consumed by the one decoded noun.
        consumed: usize,
        /// Total bits supplied to the decoder.
        length: usize,
    },
}
