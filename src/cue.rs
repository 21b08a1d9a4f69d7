//! Cue: decode a jammed bit stream back into a noun.
//!
//! The stream is consumed front to back. Every node's start offset is
//! remembered once the node is complete, so a later `11`-tagged
//! back-reference can resolve to it; offsets that are not the start of an
//! already finished node are a hard [`DanglingBackref`](CueError::DanglingBackref)
//! error, never a silent default.
//!
//! Decoding is driven by an explicit frame stack rather than recursion: the
//! input is the untrusted side of the codec, and a hostile deeply nested
//! stream must not be able to exhaust the call stack.

use std::collections::HashMap;
use std::rc::Rc;

use num_bigint::BigUint;

use crate::bits::{self, BitReader};
use crate::error::CueError;
use crate::noun::Noun;
use crate::uint;
use crate::NounBitSlice;

/// A cell whose children are still being decoded.
enum Frame {
    /// Tags read, waiting for the head.
    Head { start: usize },
    /// Head done, waiting for the tail.
    Tail { start: usize, head: Rc<Noun> },
}

/// Decode a packed noun.
///
/// The minimal bit-length of `packed` defines where the stream ends; there is
/// no end marker in the format itself. Callers that received the encoding as
/// bytes must convert with a least-significant-byte-first interpretation
/// (`BigUint::from_bytes_le`) so no meaningful bit is dropped or invented.
///
/// # Example
/// ```rust
/// use jamcue::{cue, jam, Noun};
/// let noun = Noun::cell(Noun::atom(8u8), Noun::atom(8u8));
/// assert_eq!(*cue(&jam(&noun)).unwrap(), noun);
/// ```
pub fn cue(packed: &BigUint) -> Result<Rc<Noun>, CueError> {
    cue_bits(&bits::unpack(packed))
}

/// Decode exactly one noun from `buffer`.
///
/// Fails with [`CueError::TrailingBits`] if decoding one full node leaves
/// bits unconsumed: a jammed noun is exactly one node, so leftovers mean the
/// caller supplied the wrong length. The check is strict by choice; callers
/// wanting to decode a prefix can slice the buffer themselves.
pub fn cue_bits(buffer: &NounBitSlice) -> Result<Rc<Noun>, CueError> {
    let mut r = BitReader::new(buffer);
    let mut cache: HashMap<usize, Rc<Noun>> = HashMap::new();
    let mut stack: Vec<Frame> = Vec::new();

    'node: loop {
        let start = r.pos();
        let mut done = if !r.read_bit()? {
            // atom
            let value = uint::decode(&mut r)?;
            let noun = Rc::new(Noun::Atom(value));
            cache.insert(start, Rc::clone(&noun));
            noun
        } else if !r.read_bit()? {
            // cell: decode the head next, remember where this cell began
            stack.push(Frame::Head { start });
            continue 'node;
        } else {
            // back-reference: only an already completed node is a valid target
            let target = uint::decode(&mut r)?;
            let resolved = usize::try_from(&target)
                .ok()
                .and_then(|t| cache.get(&t))
                .cloned()
                .ok_or(CueError::DanglingBackref(target))?;
            cache.insert(start, Rc::clone(&resolved));
            resolved
        };

        // hand the finished node up through the pending cell frames
        loop {
            match stack.pop() {
                None => {
                    if !r.is_exhausted() {
                        return Err(CueError::TrailingBits {
                            consumed: r.pos(),
                            length: buffer.len(),
                        });
                    }
                    return Ok(done);
                }
                Some(Frame::Head { start }) => {
                    stack.push(Frame::Tail { start, head: done });
                    continue 'node;
                }
                Some(Frame::Tail { start, head }) => {
                    let cell = Rc::new(Noun::Cell(head, done));
                    cache.insert(start, Rc::clone(&cell));
                    done = cell;
                }
            }
        }
    }
}
